//! Viewfinder screen wiring.
//!
//! Gates the camera session behind the access-granted signal and fans a
//! view-space tap out to the session controller (after transforming it
//! into surface space) and to the auto-focus indicator.

mod transform;

pub use transform::{CoordinateTransformer, IdentityTransformer, ScaleTransformer};

use crate::capture::{HostContext, Point};
use crate::indicator::{FocusIndicator, FocusRequestId};
use crate::session::{CameraSessionController, LifecycleScope, SessionError};
use std::sync::Arc;

/// One viewfinder screen instance.
pub struct ViewfinderScreen {
    controller: Arc<CameraSessionController>,
    indicator: FocusIndicator,
    transformer: Box<dyn CoordinateTransformer>,
}

impl ViewfinderScreen {
    /// Creates a screen that passes taps through untransformed.
    pub fn new(controller: Arc<CameraSessionController>, indicator: FocusIndicator) -> Self {
        Self {
            controller,
            indicator,
            transformer: Box::new(IdentityTransformer),
        }
    }

    /// Uses `transformer` to map view-space taps into surface space.
    pub fn with_transformer(mut self, transformer: impl CoordinateTransformer + 'static) -> Self {
        self.transformer = Box::new(transformer);
        self
    }

    /// Runs the camera session for the length of `scope`.
    ///
    /// Does not touch the camera unless `access_granted` is true.
    pub async fn run(
        &self,
        access_granted: bool,
        scope: &LifecycleScope,
        host: &HostContext,
    ) -> Result<(), SessionError> {
        if !access_granted {
            tracing::info!(host = host.name(), "Camera access not granted");
            return Err(SessionError::AccessNotGranted);
        }
        self.controller.bind_session(scope, host).await
    }

    /// Handles a tap in view space.
    ///
    /// Taps are ignored until the viewfinder has a surface to show.
    /// Returns the indicator request created for the tap.
    pub fn on_tap(&self, view_point: Point) -> Option<FocusRequestId> {
        if self.controller.current_frame().borrow().is_none() {
            tracing::trace!(?view_point, "Tap ignored: viewfinder not showing");
            return None;
        }
        self.controller
            .focus_at(self.transformer.transform(view_point));
        Some(self.indicator.tap(view_point))
    }

    /// Returns the session controller.
    pub fn controller(&self) -> &Arc<CameraSessionController> {
        &self.controller
    }

    /// Returns the auto-focus indicator.
    pub fn indicator(&self) -> &FocusIndicator {
        &self.indicator
    }
}
