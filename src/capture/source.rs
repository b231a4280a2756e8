//! Frame source adapter.
//!
//! Holds the single current [`SurfaceRequest`] in a last-value cell and
//! keeps the [`MeteringPointFactory`] in step with its resolution.
//! Publishing never queues: observers only ever see the latest request.

use super::{Resolution, SurfaceRequest};
use crate::metering::{MeteringPointFactory, DEFAULT_POINT_SIZE};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

/// Preview pipeline output shared between the camera provider (writer)
/// and the session controller and rendering surface (readers).
#[derive(Clone)]
pub struct FrameSource {
    inner: Arc<Inner>,
}

struct Inner {
    current: watch::Sender<Option<SurfaceRequest>>,
    factory: RwLock<Option<MeteringPointFactory>>,
    next_sequence: AtomicU64,
    published: AtomicU64,
    point_size: f32,
}

impl FrameSource {
    /// Creates a frame source with the default metering point size.
    pub fn new() -> Self {
        Self::with_point_size(DEFAULT_POINT_SIZE)
    }

    /// Creates a frame source whose metering factories use `point_size`.
    pub fn with_point_size(point_size: f32) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                current,
                factory: RwLock::new(None),
                next_sequence: AtomicU64::new(1),
                published: AtomicU64::new(0),
                point_size,
            }),
        }
    }

    /// Publishes a new surface request, replacing the previous one.
    ///
    /// The metering factory is rebuilt before observers are notified so
    /// that a reader reacting to the new request sees a matching factory.
    pub fn publish(&self, request: SurfaceRequest) {
        let factory = MeteringPointFactory::from_resolution(request.resolution())
            .with_default_size(self.inner.point_size);
        if let Ok(mut slot) = self.inner.factory.write() {
            *slot = Some(factory);
        }
        self.inner.published.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            resolution = %request.resolution(),
            sequence = request.sequence(),
            "Surface request published"
        );
        self.inner.current.send_replace(Some(request));
    }

    /// Builds and publishes a request for `resolution` with the next
    /// sequence number.
    pub fn publish_resolution(&self, resolution: Resolution) -> SurfaceRequest {
        let sequence = self.inner.next_sequence.fetch_add(1, Ordering::Relaxed);
        let request = SurfaceRequest::new(resolution, sequence);
        self.publish(request.clone());
        request
    }

    /// Returns a receiver that starts at the latest request.
    pub fn subscribe(&self) -> watch::Receiver<Option<SurfaceRequest>> {
        self.inner.current.subscribe()
    }

    /// Returns the latest request, if any.
    pub fn latest(&self) -> Option<SurfaceRequest> {
        self.inner.current.borrow().clone()
    }

    /// Returns the factory for the latest request's resolution.
    pub fn metering_point_factory(&self) -> Option<MeteringPointFactory> {
        self.inner.factory.read().ok().and_then(|slot| slot.clone())
    }

    /// Total requests published over the lifetime of this source.
    pub fn published_count(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Drops the current request and its factory.
    ///
    /// Called at session boundaries so nothing derived from one session
    /// is visible to the next.
    pub fn reset(&self) {
        if let Ok(mut slot) = self.inner.factory.write() {
            *slot = None;
        }
        self.inner.current.send_if_modified(|current| current.take().is_some());
    }
}

impl Default for FrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("latest", &*self.inner.current.borrow())
            .field("published", &self.published_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_factory_before_publish() {
        let source = FrameSource::new();

        assert!(source.latest().is_none());
        assert!(source.metering_point_factory().is_none());
    }

    #[test]
    fn test_publish_rebuilds_factory() {
        let source = FrameSource::new();

        source.publish_resolution(Resolution::new(640, 480));
        let factory = source.metering_point_factory().unwrap();
        assert_eq!(factory.surface_size(), (640.0, 480.0));

        source.publish_resolution(Resolution::new(1920, 1080));
        let factory = source.metering_point_factory().unwrap();
        assert_eq!(factory.surface_size(), (1920.0, 1080.0));
    }

    #[test]
    fn test_late_subscriber_sees_latest() {
        let source = FrameSource::new();
        source.publish_resolution(Resolution::new(320, 240));
        let second = source.publish_resolution(Resolution::new(640, 480));

        let rx = source.subscribe();
        assert_eq!(rx.borrow().as_ref(), Some(&second));
    }

    #[tokio::test]
    async fn test_existing_subscriber_notified_once_per_publish() {
        let source = FrameSource::new();
        let mut rx = source.subscribe();

        source.publish_resolution(Resolution::new(640, 480));
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_reset_clears_request_and_factory() {
        let source = FrameSource::new();
        source.publish_resolution(Resolution::new(640, 480));

        source.reset();

        assert!(source.latest().is_none());
        assert!(source.metering_point_factory().is_none());
        assert_eq!(source.published_count(), 1);
    }

    proptest! {
        #[test]
        fn prop_observer_sees_only_latest(
            sizes in proptest::collection::vec((1u32..4000, 1u32..4000), 1..20),
            subscribe_at in 0usize..20,
        ) {
            let source = FrameSource::new();
            let mut rx = None;
            let mut last = None;

            for (i, (w, h)) in sizes.iter().enumerate() {
                if i == subscribe_at {
                    rx = Some(source.subscribe());
                }
                last = Some(source.publish_resolution(Resolution::new(*w, *h)));
            }

            let rx = rx.unwrap_or_else(|| source.subscribe());
            let seen = rx.borrow().clone();
            prop_assert_eq!(seen.as_ref(), last.as_ref());
            let factory = source.metering_point_factory().unwrap();
            let res = last.unwrap().resolution();
            prop_assert_eq!(factory.surface_size(), (res.width as f32, res.height as f32));
        }
    }
}
