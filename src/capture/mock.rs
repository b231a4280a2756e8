//! Mock camera provider for tests and the demo binary.
//!
//! Simulates provider start-up and bind latency, announces a surface
//! request on bind the way a real preview pipeline does, and records
//! every acquisition, bind, unbind and focus submission.

use super::{
    BoundCamera, CameraControl, CameraError, CameraProvider, CameraProviderFactory,
    CameraSelector, FrameSource, HostContext, LensFacing, Resolution,
};
use crate::metering::FocusMeteringAction;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Behaviour of a [`MockCameraProvider`].
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Resolution announced on bind, `None` to announce nothing.
    pub resolution: Option<Resolution>,
    /// Simulated provider initialization time.
    pub acquire_delay: Duration,
    /// Simulated bind time.
    pub bind_delay: Duration,
    /// Fail provider acquisition.
    pub fail_acquire: bool,
    /// Lenses present on the simulated device.
    pub lenses: Vec<LensFacing>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            resolution: Some(Resolution::new(640, 480)),
            acquire_delay: Duration::ZERO,
            bind_delay: Duration::ZERO,
            fail_acquire: false,
            lenses: vec![LensFacing::Front, LensFacing::Back],
        }
    }
}

/// Records focus commands; optionally rejects them.
#[derive(Debug, Default)]
pub struct MockCameraControl {
    submitted: Mutex<Vec<FocusMeteringAction>>,
    reject: AtomicBool,
}

impl MockCameraControl {
    /// Makes subsequent submissions fail.
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::Relaxed);
    }

    /// Returns the actions accepted so far.
    pub fn submitted(&self) -> Vec<FocusMeteringAction> {
        self.submitted
            .lock()
            .map(|actions| actions.clone())
            .unwrap_or_default()
    }
}

impl CameraControl for MockCameraControl {
    fn start_focus_and_metering(&self, action: FocusMeteringAction) -> Result<(), CameraError> {
        if self.reject.load(Ordering::Relaxed) {
            return Err(CameraError::FocusRejected("mock rejection".into()));
        }
        if let Ok(mut actions) = self.submitted.lock() {
            actions.push(action);
        }
        Ok(())
    }
}

struct MockBoundCamera {
    control: Arc<MockCameraControl>,
}

impl BoundCamera for MockBoundCamera {
    fn control(&self) -> Arc<dyn CameraControl> {
        self.control.clone()
    }
}

#[derive(Default)]
struct MockState {
    acquisitions: AtomicUsize,
    binds: AtomicUsize,
    unbinds: AtomicUsize,
    reject_focus: AtomicBool,
    controls: Mutex<Vec<Arc<MockCameraControl>>>,
    preview: Mutex<Option<FrameSource>>,
}

/// Provider and provider factory backed by in-memory state.
///
/// Clones share state, so a test can keep one handle while the session
/// controller owns another.
#[derive(Clone, Default)]
pub struct MockCameraProvider {
    config: MockConfig,
    state: Arc<MockState>,
}

impl MockCameraProvider {
    /// Creates a provider with the default behaviour.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with the given behaviour.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            state: Arc::default(),
        }
    }

    /// Number of successful provider acquisitions.
    pub fn acquisitions(&self) -> usize {
        self.state.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of successful binds.
    pub fn binds(&self) -> usize {
        self.state.binds.load(Ordering::SeqCst)
    }

    /// Number of `unbind_all` calls.
    pub fn unbinds(&self) -> usize {
        self.state.unbinds.load(Ordering::SeqCst)
    }

    /// Returns true while a preview pipeline is attached.
    pub fn is_bound(&self) -> bool {
        self.state
            .preview
            .lock()
            .map(|preview| preview.is_some())
            .unwrap_or(false)
    }

    /// Makes focus commands on current and future controls fail.
    pub fn set_reject_focus(&self, reject: bool) {
        self.state.reject_focus.store(reject, Ordering::Relaxed);
        if let Ok(controls) = self.state.controls.lock() {
            for control in controls.iter() {
                control.set_reject(reject);
            }
        }
    }

    /// All focus commands accepted across every bind.
    pub fn submitted(&self) -> Vec<FocusMeteringAction> {
        self.state
            .controls
            .lock()
            .map(|controls| controls.iter().flat_map(|c| c.submitted()).collect())
            .unwrap_or_default()
    }

    /// Simulates the pipeline renegotiating its buffer.
    ///
    /// Returns false if nothing is bound.
    pub fn announce(&self, resolution: Resolution) -> bool {
        let preview = self
            .state
            .preview
            .lock()
            .ok()
            .and_then(|preview| preview.clone());
        match preview {
            Some(preview) => {
                preview.publish_resolution(resolution);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CameraProviderFactory for MockCameraProvider {
    async fn acquire(&self, host: &HostContext) -> Result<Arc<dyn CameraProvider>, CameraError> {
        if !self.config.acquire_delay.is_zero() {
            tokio::time::sleep(self.config.acquire_delay).await;
        }
        if self.config.fail_acquire {
            return Err(CameraError::ProviderUnavailable(format!(
                "mock provider disabled for {}",
                host.name()
            )));
        }
        self.state.acquisitions.fetch_add(1, Ordering::SeqCst);
        tracing::info!(host = host.name(), "MockCameraProvider acquired");
        Ok(Arc::new(self.clone()))
    }
}

#[async_trait]
impl CameraProvider for MockCameraProvider {
    async fn bind_to_lifecycle(
        &self,
        selector: CameraSelector,
        preview: FrameSource,
    ) -> Result<Box<dyn BoundCamera>, CameraError> {
        if !self.config.bind_delay.is_zero() {
            tokio::time::sleep(self.config.bind_delay).await;
        }
        if !self.config.lenses.contains(&selector.facing) {
            return Err(CameraError::NoMatchingCamera(selector.facing));
        }

        let control = Arc::new(MockCameraControl::default());
        control.set_reject(self.state.reject_focus.load(Ordering::Relaxed));
        if let Ok(mut controls) = self.state.controls.lock() {
            controls.push(Arc::clone(&control));
        }
        if let Ok(mut slot) = self.state.preview.lock() {
            *slot = Some(preview.clone());
        }
        self.state.binds.fetch_add(1, Ordering::SeqCst);
        tracing::info!(facing = ?selector.facing, "MockCameraProvider bound");

        if let Some(resolution) = self.config.resolution {
            preview.publish_resolution(resolution);
        }
        Ok(Box::new(MockBoundCamera { control }))
    }

    fn unbind_all(&self) {
        if let Ok(mut slot) = self.state.preview.lock() {
            *slot = None;
        }
        self.state.unbinds.fetch_add(1, Ordering::SeqCst);
        tracing::info!("MockCameraProvider unbound");
    }
}
