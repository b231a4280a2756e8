//! Camera session controller.
//!
//! Owns the bind/unbind lifecycle of the preview pipeline and the control
//! handle it yields. A session moves through
//! `Unbound -> Binding -> Bound -> Unbound`; a failed provider acquisition
//! or bind goes straight from `Binding` back to `Unbound`.
//!
//! Release is driven by a drop guard, so it runs on every exit path of
//! [`CameraSessionController::bind_session`]: normal scope end, scope end
//! while still binding, a failed bind, or the bind future being dropped.

use super::LifecycleScope;
use crate::capture::{
    CameraControl, CameraError, CameraProvider, CameraProviderFactory, CameraSelector,
    FrameSource, HostContext, Point, SurfaceRequest,
};
use crate::config::FocusConfig;
use crate::metering::FocusMeteringAction;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Errors surfaced by session binding.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The access-granted signal was false.
    #[error("camera access has not been granted")]
    AccessNotGranted,
    /// Another bind is already in progress or bound.
    #[error("a camera session is already active")]
    AlreadyBinding,
    /// The camera provider failed to acquire or bind.
    #[error(transparent)]
    Provider(#[from] CameraError),
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No camera is bound.
    Unbound,
    /// Acquiring the provider or binding the camera.
    Binding,
    /// The camera is bound and focus commands are accepted.
    Bound,
}

/// Point-in-time view of the controller's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Whether a session is currently bound.
    pub is_bound: bool,
    /// Sessions bound.
    pub binds: u64,
    /// Provider unbinds.
    pub unbinds: u64,
    /// Surface requests published.
    pub frames_published: u64,
    /// Focus commands accepted by the camera.
    pub focus_submitted: u64,
    /// Taps ignored for lack of a session or surface.
    pub focus_skipped: u64,
    /// Focus commands rejected by the camera.
    pub focus_failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    binds: AtomicU64,
    unbinds: AtomicU64,
    focus_submitted: AtomicU64,
    focus_skipped: AtomicU64,
    focus_failed: AtomicU64,
}

/// Binds the camera for the length of a lifecycle scope and routes taps
/// to the lens as focus and metering commands.
pub struct CameraSessionController {
    factory: Arc<dyn CameraProviderFactory>,
    selector: CameraSelector,
    source: FrameSource,
    control: RwLock<Option<Arc<dyn CameraControl>>>,
    state: watch::Sender<SessionState>,
    active: AtomicBool,
    auto_cancel: Duration,
    counters: Counters,
}

impl CameraSessionController {
    /// Creates a controller with default focus settings.
    pub fn new(factory: Arc<dyn CameraProviderFactory>) -> Self {
        Self::with_config(factory, &FocusConfig::default())
    }

    /// Creates a controller using the given focus settings.
    pub fn with_config(factory: Arc<dyn CameraProviderFactory>, config: &FocusConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Unbound);
        Self {
            factory,
            selector: CameraSelector::DEFAULT_FRONT,
            source: FrameSource::with_point_size(config.metering_point_size),
            control: RwLock::new(None),
            state,
            active: AtomicBool::new(false),
            auto_cancel: config.auto_cancel(),
            counters: Counters::default(),
        }
    }

    /// Binds the camera and stays bound until `scope` ends.
    ///
    /// Suspends for the whole time the camera is active. Returns `Ok(())`
    /// once the scope has ended and the session has been released, or an
    /// error if the provider could not be acquired or bound. Only one
    /// session may be active per controller; a second concurrent call is
    /// rejected with [`SessionError::AlreadyBinding`].
    pub async fn bind_session(
        &self,
        scope: &LifecycleScope,
        host: &HostContext,
    ) -> Result<(), SessionError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(host = host.name(), "Rejected bind while a session is active");
            return Err(SessionError::AlreadyBinding);
        }

        let mut guard = SessionGuard {
            controller: self,
            provider: None,
        };
        self.source.reset();
        self.state.send_replace(SessionState::Binding);
        tracing::info!(host = host.name(), selector = ?self.selector, "Binding camera session");

        let provider = tokio::select! {
            biased;
            _ = scope.ended() => {
                tracing::info!("Lifecycle ended while acquiring camera provider");
                return Ok(());
            }
            provider = self.factory.acquire(host) => provider.map_err(|e| {
                tracing::error!(error = %e, "Camera provider acquisition failed");
                e
            })?,
        };
        guard.provider = Some(Arc::clone(&provider));

        let camera = tokio::select! {
            biased;
            _ = scope.ended() => {
                tracing::info!("Lifecycle ended while binding camera");
                return Ok(());
            }
            camera = provider.bind_to_lifecycle(self.selector, self.source.clone()) => {
                camera.map_err(|e| {
                    tracing::error!(error = %e, "Camera bind failed");
                    e
                })?
            }
        };

        if let Ok(mut slot) = self.control.write() {
            *slot = Some(camera.control());
        }
        self.counters.binds.fetch_add(1, Ordering::Relaxed);
        self.state.send_replace(SessionState::Bound);
        tracing::info!("Camera session bound");

        scope.ended().await;
        tracing::info!("Lifecycle ended, releasing camera session");
        Ok(())
    }

    /// Focuses and meters at `point`, given in surface-request space.
    ///
    /// A no-op until a surface request has been observed in the current
    /// session, and after the session is released. Submission failures
    /// are logged and counted but not reported.
    pub fn focus_at(&self, point: Point) {
        let Some(factory) = self.source.metering_point_factory() else {
            self.counters.focus_skipped.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(?point, "Focus skipped: no surface request yet");
            return;
        };
        let Some(control) = self.control() else {
            self.counters.focus_skipped.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(?point, "Focus skipped: session not bound");
            return;
        };

        let metering_point = factory.point_at(point);
        let action = FocusMeteringAction::builder(metering_point)
            .set_auto_cancel(self.auto_cancel)
            .build();

        match control.start_focus_and_metering(action) {
            Ok(()) => {
                self.counters.focus_submitted.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    x = metering_point.x,
                    y = metering_point.y,
                    "Focus and metering submitted"
                );
            }
            Err(e) => {
                self.counters.focus_failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, "Focus and metering rejected");
            }
        }
    }

    /// Latest surface request, replayed to new subscribers.
    pub fn current_frame(&self) -> watch::Receiver<Option<SurfaceRequest>> {
        self.source.subscribe()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Returns a receiver that follows the lifecycle state.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Returns true if a control handle is held.
    pub fn has_control(&self) -> bool {
        self.control().is_some()
    }

    /// Returns a snapshot of the session counters.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            is_bound: self.state() == SessionState::Bound,
            binds: self.counters.binds.load(Ordering::Relaxed),
            unbinds: self.counters.unbinds.load(Ordering::Relaxed),
            frames_published: self.source.published_count(),
            focus_submitted: self.counters.focus_submitted.load(Ordering::Relaxed),
            focus_skipped: self.counters.focus_skipped.load(Ordering::Relaxed),
            focus_failed: self.counters.focus_failed.load(Ordering::Relaxed),
        }
    }

    fn control(&self) -> Option<Arc<dyn CameraControl>> {
        self.control.read().ok().and_then(|slot| slot.clone())
    }

    fn release(&self) {
        if let Ok(mut slot) = self.control.write() {
            *slot = None;
        }
        self.source.reset();
        self.active.store(false, Ordering::SeqCst);
        self.state.send_replace(SessionState::Unbound);
    }
}

impl std::fmt::Debug for CameraSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSessionController")
            .field("selector", &self.selector)
            .field("state", &self.state())
            .field("has_control", &self.has_control())
            .finish()
    }
}

/// Releases the session when dropped.
struct SessionGuard<'a> {
    controller: &'a CameraSessionController,
    provider: Option<Arc<dyn CameraProvider>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            provider.unbind_all();
            self.controller
                .counters
                .unbinds
                .fetch_add(1, Ordering::Relaxed);
        }
        self.controller.release();
        tracing::info!("Camera session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{MockCameraProvider, MockConfig, Resolution};

    fn controller_for(mock: &MockCameraProvider) -> Arc<CameraSessionController> {
        Arc::new(CameraSessionController::new(Arc::new(mock.clone())))
    }

    fn spawn_bind(
        controller: &Arc<CameraSessionController>,
        scope: &LifecycleScope,
    ) -> tokio::task::JoinHandle<Result<(), SessionError>> {
        let controller = Arc::clone(controller);
        let scope = scope.clone();
        tokio::spawn(async move {
            controller
                .bind_session(&scope, &HostContext::new("test"))
                .await
        })
    }

    async fn wait_for_state(controller: &CameraSessionController, want: SessionState) {
        let mut rx = controller.subscribe_state();
        rx.wait_for(|state| *state == want).await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_tap_unbind_scenario() {
        let mock = MockCameraProvider::new();
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let handle = spawn_bind(&controller, &scope);
        wait_for_state(&controller, SessionState::Bound).await;
        assert!(controller.has_control());
        assert_eq!(
            controller.current_frame().borrow().as_ref().map(|r| r.resolution()),
            Some(Resolution::new(640, 480))
        );

        controller.focus_at(Point::new(320.0, 240.0));
        let submitted = mock.submitted();
        assert_eq!(submitted.len(), 1);
        let point = submitted[0].primary_point();
        assert_eq!((point.x, point.y), (0.5, 0.5));

        scope.end();
        handle.await.unwrap().unwrap();
        assert_eq!(controller.state(), SessionState::Unbound);
        assert!(!controller.has_control());
        assert_eq!(mock.unbinds(), 1);

        controller.focus_at(Point::new(100.0, 100.0));
        assert_eq!(mock.submitted().len(), 1);
    }

    #[tokio::test]
    async fn test_focus_without_frame_is_noop() {
        let mock = MockCameraProvider::with_config(MockConfig {
            resolution: None,
            ..Default::default()
        });
        let controller = controller_for(&mock);

        controller.focus_at(Point::new(10.0, 10.0));

        let scope = LifecycleScope::new();
        let handle = spawn_bind(&controller, &scope);
        wait_for_state(&controller, SessionState::Bound).await;

        controller.focus_at(Point::new(10.0, 10.0));
        assert!(mock.submitted().is_empty());
        assert_eq!(controller.stats().focus_skipped, 2);

        scope.end();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_focus_uses_latest_resolution() {
        let mock = MockCameraProvider::new();
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let handle = spawn_bind(&controller, &scope);
        wait_for_state(&controller, SessionState::Bound).await;

        assert!(mock.announce(Resolution::new(1280, 720)));
        controller.focus_at(Point::new(320.0, 240.0));

        let point = mock.submitted()[0].primary_point();
        assert_eq!(point.x, 0.25);
        assert!((point.y - 240.0 / 720.0).abs() < f32::EPSILON);

        scope.end();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_scope_end_during_bind_releases_once() {
        let mock = MockCameraProvider::with_config(MockConfig {
            bind_delay: Duration::from_millis(500),
            ..Default::default()
        });
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let handle = spawn_bind(&controller, &scope);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.state(), SessionState::Binding);

        scope.end();
        handle.await.unwrap().unwrap();

        assert_eq!(mock.acquisitions(), 1);
        assert_eq!(mock.binds(), 0);
        assert_eq!(mock.unbinds(), 1);
        assert!(!controller.has_control());
        assert_eq!(controller.state(), SessionState::Unbound);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scope_end_during_acquire_binds_nothing() {
        let mock = MockCameraProvider::with_config(MockConfig {
            acquire_delay: Duration::from_millis(500),
            ..Default::default()
        });
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let handle = spawn_bind(&controller, &scope);
        tokio::time::sleep(Duration::from_millis(100)).await;
        scope.end();
        handle.await.unwrap().unwrap();

        assert_eq!(mock.acquisitions(), 0);
        assert_eq!(mock.unbinds(), 0);
        assert_eq!(controller.state(), SessionState::Unbound);
    }

    #[tokio::test]
    async fn test_dropped_bind_future_releases() {
        let mock = MockCameraProvider::new();
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let handle = spawn_bind(&controller, &scope);
        wait_for_state(&controller, SessionState::Bound).await;

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        assert_eq!(mock.unbinds(), 1);
        assert!(!mock.is_bound());
        assert!(!controller.has_control());
        assert_eq!(controller.state(), SessionState::Unbound);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let mock = MockCameraProvider::with_config(MockConfig {
            fail_acquire: true,
            ..Default::default()
        });
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let result = controller
            .bind_session(&scope, &HostContext::new("test"))
            .await;
        assert!(matches!(
            result,
            Err(SessionError::Provider(CameraError::ProviderUnavailable(_)))
        ));
        assert_eq!(controller.state(), SessionState::Unbound);
        assert_eq!(mock.unbinds(), 0);

        // Not stuck in an active state after the failure.
        let again = controller
            .bind_session(&scope, &HostContext::new("test"))
            .await;
        assert!(matches!(again, Err(SessionError::Provider(_))));
    }

    #[tokio::test]
    async fn test_bind_failure_still_unbinds() {
        let mock = MockCameraProvider::with_config(MockConfig {
            lenses: vec![crate::capture::LensFacing::Back],
            ..Default::default()
        });
        let controller = controller_for(&mock);

        let result = controller
            .bind_session(&LifecycleScope::new(), &HostContext::new("test"))
            .await;
        assert!(matches!(
            result,
            Err(SessionError::Provider(CameraError::NoMatchingCamera(_)))
        ));
        assert_eq!(mock.unbinds(), 1);
        assert_eq!(controller.state(), SessionState::Unbound);
    }

    #[tokio::test]
    async fn test_concurrent_bind_rejected() {
        let mock = MockCameraProvider::new();
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let handle = spawn_bind(&controller, &scope);
        wait_for_state(&controller, SessionState::Bound).await;

        let second = controller
            .bind_session(&scope.child(), &HostContext::new("second"))
            .await;
        assert!(matches!(second, Err(SessionError::AlreadyBinding)));
        assert!(controller.has_control());

        scope.end();
        handle.await.unwrap().unwrap();
        assert_eq!(mock.binds(), 1);
        assert_eq!(mock.unbinds(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_rebind_accepted_once_unbound_observed() {
        let mock = MockCameraProvider::new();
        let controller = controller_for(&mock);

        for _ in 0..20 {
            let scope = LifecycleScope::new();
            let handle = spawn_bind(&controller, &scope);
            wait_for_state(&controller, SessionState::Bound).await;

            let mut state = controller.subscribe_state();
            scope.end();
            state
                .wait_for(|s| *s == SessionState::Unbound)
                .await
                .unwrap();

            // The releasing task may still be running; seeing Unbound must
            // be enough to start again.
            let ended = LifecycleScope::new();
            ended.end();
            let again = controller
                .bind_session(&ended, &HostContext::new("rebind"))
                .await;
            assert!(again.is_ok(), "rebind rejected: {again:?}");

            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn test_rebind_starts_fresh() {
        let mock = MockCameraProvider::new();
        let controller = controller_for(&mock);

        let first = LifecycleScope::new();
        let handle = spawn_bind(&controller, &first);
        wait_for_state(&controller, SessionState::Bound).await;
        first.end();
        handle.await.unwrap().unwrap();
        assert!(controller.current_frame().borrow().is_none());

        let second = LifecycleScope::new();
        let handle = spawn_bind(&controller, &second);
        wait_for_state(&controller, SessionState::Bound).await;
        controller.focus_at(Point::new(0.0, 0.0));
        second.end();
        handle.await.unwrap().unwrap();

        let stats = controller.stats();
        assert_eq!(stats.binds, 2);
        assert_eq!(stats.unbinds, 2);
        assert_eq!(stats.focus_submitted, 1);
        assert_eq!(stats.frames_published, 2);
    }

    #[tokio::test]
    async fn test_focus_rejection_suppressed() {
        let mock = MockCameraProvider::new();
        let controller = controller_for(&mock);
        let scope = LifecycleScope::new();

        let handle = spawn_bind(&controller, &scope);
        wait_for_state(&controller, SessionState::Bound).await;

        mock.set_reject_focus(true);
        controller.focus_at(Point::new(1.0, 1.0));
        assert!(mock.submitted().is_empty());
        assert_eq!(controller.stats().focus_failed, 1);

        scope.end();
        handle.await.unwrap().unwrap();
    }
}
