//! Prometheus metrics for the viewfinder.
//!
//! # Metrics Exposed
//!
//! ## Session Metrics
//! - `viewfinder_session_bound` - Current session status (1=bound, 0=unbound)
//! - `viewfinder_session_binds_total` - Sessions bound
//! - `viewfinder_session_unbinds_total` - Provider unbinds
//!
//! ## Frame Metrics
//! - `viewfinder_frames_published_total` - Surface requests published
//!
//! ## Focus Metrics
//! - `viewfinder_focus_submitted_total` - Focus commands accepted
//! - `viewfinder_focus_skipped_total` - Taps with no session or surface
//! - `viewfinder_focus_failed_total` - Focus commands rejected
//! - `viewfinder_focus_indicator_visible` - Indicator showing (1/0)

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
