//! Camera Viewfinder Library
//!
//! The session core behind a live camera viewfinder with tap-to-focus.
//! It owns the camera session lifecycle, republishes the preview
//! pipeline's surface requests to a rendering surface, and turns screen
//! taps into focus and metering commands on the lens.
//!
//! # Architecture
//!
//! ```text
//! camera provider → frame source → session controller → rendering surface
//!                                        ↑
//!                     tap → transform → screen → focus indicator
//! ```
//!
//! # Design Principles
//!
//! - **Latest value only**: surface requests and indicator state are
//!   single-slot observables; intermediate values may be skipped
//! - **Guaranteed release**: the camera is unbound on every exit path of
//!   a bind, including cancellation
//! - **Best-effort focus**: taps without a session are ignored and focus
//!   failures are never surfaced
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use viewfinder::{
//!     capture::{HostContext, MockCameraProvider, Point},
//!     indicator::FocusIndicator,
//!     screen::ViewfinderScreen,
//!     session::{CameraSessionController, LifecycleScope},
//! };
//!
//! # async fn demo() -> Result<(), viewfinder::session::SessionError> {
//! let provider = MockCameraProvider::new();
//! let controller = Arc::new(CameraSessionController::new(Arc::new(provider)));
//! let screen = Arc::new(ViewfinderScreen::new(controller, FocusIndicator::default()));
//! let scope = LifecycleScope::new();
//!
//! let runner = Arc::clone(&screen);
//! let run_scope = scope.clone();
//! let session = tokio::spawn(async move {
//!     runner.run(true, &run_scope, &HostContext::new("demo")).await
//! });
//!
//! screen.on_tap(Point::new(320.0, 240.0));
//!
//! scope.end();
//! session.await.expect("session task panicked")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod indicator;
pub mod metering;
pub mod metrics;
pub mod screen;
pub mod session;

// Re-export commonly used types at crate root
pub use capture::{FrameSource, MockCameraProvider, Point, Resolution, SurfaceRequest};
pub use config::{FileConfig, FocusConfig};
pub use indicator::{FocusIndicator, FocusRequest};
pub use metering::{FocusMeteringAction, MeteringPoint, MeteringPointFactory};
pub use screen::ViewfinderScreen;
pub use session::{CameraSessionController, LifecycleScope, SessionError, SessionState};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
