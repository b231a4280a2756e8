//! Auto-focus indicator state.
//!
//! Each tap replaces the indicator with a fresh [`FocusRequest`] and
//! schedules a deferred clear keyed by the request's identifier. When the
//! timer fires it only clears the indicator if that identifier is still
//! the live one, so a stale timer never hides a newer tap.

use crate::capture::Point;
use crate::config::FocusConfig;
use rand_core::{OsRng, RngCore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Identifies one tap's indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusRequestId(u64);

impl FocusRequestId {
    fn random() -> Self {
        Self(OsRng.next_u64())
    }
}

/// Where to draw the auto-focus indicator, if anywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusRequest {
    /// Identifier of the tap that produced this state.
    pub id: FocusRequestId,
    /// Tap position in view space; `None` hides the indicator.
    pub position: Option<Point>,
}

impl FocusRequest {
    /// Returns true if the indicator should be drawn.
    pub fn is_visible(&self) -> bool {
        self.position.is_some()
    }
}

/// Observable auto-focus indicator with an identity-keyed timeout.
pub struct FocusIndicator {
    state: Arc<watch::Sender<FocusRequest>>,
    timeout: Duration,
}

impl FocusIndicator {
    /// Creates a hidden indicator that hides `timeout` after each tap.
    pub fn new(timeout: Duration) -> Self {
        let (state, _) = watch::channel(FocusRequest {
            id: FocusRequestId::random(),
            position: None,
        });
        Self {
            state: Arc::new(state),
            timeout,
        }
    }

    /// Creates an indicator using the configured timeout.
    pub fn from_config(config: &FocusConfig) -> Self {
        Self::new(config.indicator_timeout())
    }

    /// Shows the indicator at `position`, replacing any previous one.
    ///
    /// Must be called from within a Tokio runtime; the hide timer runs as
    /// a spawned task.
    pub fn tap(&self, position: Point) -> FocusRequestId {
        let id = FocusRequestId::random();
        self.state.send_replace(FocusRequest {
            id,
            position: Some(position),
        });

        let state = Arc::clone(&self.state);
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if expire(&state, id) {
                tracing::trace!(?id, "Auto-focus indicator expired");
            }
        });
        id
    }

    /// Returns the current indicator state.
    pub fn current(&self) -> FocusRequest {
        *self.state.borrow()
    }

    /// Returns true if the indicator is showing.
    pub fn is_visible(&self) -> bool {
        self.current().is_visible()
    }

    /// Returns a receiver that starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<FocusRequest> {
        self.state.subscribe()
    }
}

impl Default for FocusIndicator {
    fn default() -> Self {
        Self::from_config(&FocusConfig::default())
    }
}

/// Hides the indicator if `id` is still the live request.
fn expire(state: &watch::Sender<FocusRequest>, id: FocusRequestId) -> bool {
    state.send_if_modified(|current| {
        if current.id == id && current.position.is_some() {
            current.position = None;
            true
        } else {
            false
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(1000);

    async fn advance_to(start: tokio::time::Instant, offset_ms: u64) {
        tokio::time::sleep_until(start + Duration::from_millis(offset_ms)).await;
    }

    #[test]
    fn test_stale_id_does_not_clear() {
        let (state, _) = watch::channel(FocusRequest {
            id: FocusRequestId(2),
            position: Some(Point::new(1.0, 1.0)),
        });

        assert!(!expire(&state, FocusRequestId(1)));
        assert!(state.borrow().is_visible());

        assert!(expire(&state, FocusRequestId(2)));
        assert!(!state.borrow().is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_indicator_hides_after_timeout() {
        let indicator = FocusIndicator::new(TIMEOUT);
        let start = tokio::time::Instant::now();
        assert!(!indicator.is_visible());

        let id = indicator.tap(Point::new(10.0, 20.0));
        assert_eq!(indicator.current().id, id);
        assert_eq!(indicator.current().position, Some(Point::new(10.0, 20.0)));

        advance_to(start, 999).await;
        assert!(indicator.is_visible());

        advance_to(start, 1001).await;
        assert!(!indicator.is_visible());
        assert_eq!(indicator.current().id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_tap_supersedes_old_timer() {
        let indicator = FocusIndicator::new(TIMEOUT);
        let start = tokio::time::Instant::now();

        let first = indicator.tap(Point::new(10.0, 10.0));
        advance_to(start, 300).await;

        let second = indicator.tap(Point::new(200.0, 150.0));
        assert_ne!(first, second);
        assert_eq!(indicator.current().position, Some(Point::new(200.0, 150.0)));

        // The first tap's timer fires at 1000 ms and must leave the
        // second tap's indicator alone.
        advance_to(start, 1100).await;
        assert!(indicator.is_visible());
        assert_eq!(indicator.current().id, second);

        advance_to(start, 1299).await;
        assert!(indicator.is_visible());

        advance_to(start, 1301).await;
        assert!(!indicator.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscriber_sees_jump_and_hide() {
        let indicator = FocusIndicator::new(TIMEOUT);
        let mut rx = indicator.subscribe();

        indicator.tap(Point::new(5.0, 5.0));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_visible());

        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_visible());
    }
}
