//! Camera pipeline and frame source adapter.
//!
//! This module provides the trait-based abstraction over the platform
//! camera provider, the [`FrameSource`] that republishes the pipeline's
//! surface requests, and a mock provider for testing.

mod camera;
mod frame;
mod mock;
mod source;

pub use camera::{
    BoundCamera, CameraControl, CameraError, CameraProvider, CameraProviderFactory,
    CameraSelector, HostContext, LensFacing,
};
pub use frame::{Point, Resolution, SurfaceRequest};
pub use mock::{MockCameraControl, MockCameraProvider, MockConfig};
pub use source::FrameSource;
