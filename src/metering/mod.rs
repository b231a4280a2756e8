//! Metering points and focus commands.
//!
//! A tap in surface space becomes a normalized [`MeteringPoint`] through a
//! [`MeteringPointFactory`] sized to the current surface request, then a
//! [`FocusMeteringAction`] submitted to the camera control.

mod action;
mod point;

pub use action::{
    FocusMeteringAction, FocusMeteringActionBuilder, MeteringMode, DEFAULT_AUTO_CANCEL,
};
pub use point::{MeteringPoint, MeteringPointFactory, DEFAULT_POINT_SIZE};
