//! Camera session lifecycle.
//!
//! The [`CameraSessionController`] binds the preview pipeline for as long
//! as a [`LifecycleScope`] is alive and translates surface-space taps into
//! focus and metering commands.

mod controller;
mod lifecycle;

pub use controller::{CameraSessionController, SessionError, SessionState, SessionStats};
pub use lifecycle::LifecycleScope;
