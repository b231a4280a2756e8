//! Camera provider abstraction.
//!
//! The platform camera stack is reached through a small set of traits so
//! that real hardware backends and mock implementations can be swapped:
//!
//! - [`CameraProviderFactory`] acquires the process-wide provider, which
//!   may take time while the platform initializes.
//! - [`CameraProvider`] binds the preview pipeline to a camera.
//! - [`BoundCamera`] is the result of a bind and hands out the
//!   [`CameraControl`] used for focus and metering.

use super::FrameSource;
use crate::metering::FocusMeteringAction;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The platform provider could not be initialized.
    #[error("camera provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// No camera on the device faces the requested way.
    #[error("no camera matches selector: {0:?}")]
    NoMatchingCamera(LensFacing),
    /// The hardware refused a focus and metering command.
    #[error("focus and metering rejected: {0}")]
    FocusRejected(String),
}

/// Which way the lens faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensFacing {
    /// Facing the user.
    Front,
    /// Facing away from the user.
    Back,
}

/// Selects a physical camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSelector {
    /// Required lens direction.
    pub facing: LensFacing,
}

impl CameraSelector {
    /// The front-facing camera, with no fallback to another lens.
    pub const DEFAULT_FRONT: Self = Self {
        facing: LensFacing::Front,
    };

    /// The back-facing camera.
    pub const DEFAULT_BACK: Self = Self {
        facing: LensFacing::Back,
    };
}

/// Host environment handle passed through to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    name: String,
}

impl HostContext {
    /// Creates a context identified by `name` in logs.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the host name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Issues focus and metering commands to an active camera.
pub trait CameraControl: Send + Sync {
    /// Starts a focus and metering run.
    ///
    /// Returns once the command is accepted for submission; the result of
    /// the focus run itself is not reported.
    fn start_focus_and_metering(&self, action: FocusMeteringAction) -> Result<(), CameraError>;
}

/// A camera with the preview pipeline attached.
pub trait BoundCamera: Send + Sync {
    /// Returns the control handle for this camera.
    fn control(&self) -> Arc<dyn CameraControl>;
}

/// The platform camera provider.
#[async_trait]
pub trait CameraProvider: Send + Sync {
    /// Attaches `preview` to the camera chosen by `selector`.
    ///
    /// The provider publishes surface requests into `preview` as the
    /// pipeline negotiates buffers.
    async fn bind_to_lifecycle(
        &self,
        selector: CameraSelector,
        preview: FrameSource,
    ) -> Result<Box<dyn BoundCamera>, CameraError>;

    /// Detaches every pipeline this provider has bound.
    ///
    /// Synchronous so it can run from a drop guard.
    fn unbind_all(&self);
}

/// Acquires the platform camera provider.
#[async_trait]
pub trait CameraProviderFactory: Send + Sync {
    /// Returns the provider once the platform has initialized it.
    async fn acquire(&self, host: &HostContext) -> Result<Arc<dyn CameraProvider>, CameraError>;
}
