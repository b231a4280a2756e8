//! Metrics collection and registry.

use crate::session::SessionStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A metric could not be created, registered or encoded.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
    /// Encoded output was not UTF-8.
    #[error("metrics output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// A snapshot of viewfinder state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Session counters from the controller.
    pub session: SessionStats,
    /// Whether the auto-focus indicator is showing.
    pub indicator_visible: bool,
}

/// Prometheus metrics registry for the viewfinder.
pub struct MetricsRegistry {
    registry: Registry,

    // Session metrics
    session_bound: IntGauge,
    binds_total: IntCounter,
    unbinds_total: IntCounter,

    // Frame metrics
    frames_published_total: IntCounter,

    // Focus metrics
    focus_submitted_total: IntCounter,
    focus_skipped_total: IntCounter,
    focus_failed_total: IntCounter,
    indicator_visible: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all viewfinder metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let session_bound = IntGauge::new(
            "viewfinder_session_bound",
            "Whether a camera session is bound (1=bound, 0=unbound)",
        )?;
        let binds_total = IntCounter::new(
            "viewfinder_session_binds_total",
            "Total camera sessions bound",
        )?;
        let unbinds_total = IntCounter::new(
            "viewfinder_session_unbinds_total",
            "Total camera provider unbinds",
        )?;
        let frames_published_total = IntCounter::new(
            "viewfinder_frames_published_total",
            "Total surface requests published by the preview pipeline",
        )?;
        let focus_submitted_total = IntCounter::new(
            "viewfinder_focus_submitted_total",
            "Focus and metering commands accepted by the camera",
        )?;
        let focus_skipped_total = IntCounter::new(
            "viewfinder_focus_skipped_total",
            "Taps ignored because no session or surface was available",
        )?;
        let focus_failed_total = IntCounter::new(
            "viewfinder_focus_failed_total",
            "Focus and metering commands rejected by the camera",
        )?;
        let indicator_visible = IntGauge::new(
            "viewfinder_focus_indicator_visible",
            "Whether the auto-focus indicator is showing",
        )?;

        registry.register(Box::new(session_bound.clone()))?;
        registry.register(Box::new(binds_total.clone()))?;
        registry.register(Box::new(unbinds_total.clone()))?;
        registry.register(Box::new(frames_published_total.clone()))?;
        registry.register(Box::new(focus_submitted_total.clone()))?;
        registry.register(Box::new(focus_skipped_total.clone()))?;
        registry.register(Box::new(focus_failed_total.clone()))?;
        registry.register(Box::new(indicator_visible.clone()))?;

        Ok(Self {
            registry,
            session_bound,
            binds_total,
            unbinds_total,
            frames_published_total,
            focus_submitted_total,
            focus_skipped_total,
            focus_failed_total,
            indicator_visible,
        })
    }

    /// Updates all metrics from a snapshot.
    ///
    /// Counters only move forward; a snapshot older than the last one
    /// applied leaves them unchanged.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        let session = &snapshot.session;
        self.session_bound.set(i64::from(session.is_bound));
        self.indicator_visible
            .set(i64::from(snapshot.indicator_visible));

        advance(&self.binds_total, session.binds);
        advance(&self.unbinds_total, session.unbinds);
        advance(&self.frames_published_total, session.frames_published);
        advance(&self.focus_submitted_total, session.focus_submitted);
        advance(&self.focus_skipped_total, session.focus_skipped);
        advance(&self.focus_failed_total, session.focus_failed);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}
