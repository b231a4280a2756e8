//! Focus and metering command built from one or more metering points.

use super::MeteringPoint;
use std::time::Duration;

/// Default delay after which the hardware drops the focus region and
/// returns to continuous auto-focus.
pub const DEFAULT_AUTO_CANCEL: Duration = Duration::from_secs(5);

/// Which 3A routines a metering point applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeteringMode {
    /// Auto-focus.
    pub af: bool,
    /// Auto-exposure.
    pub ae: bool,
    /// Auto-white-balance.
    pub awb: bool,
}

impl MeteringMode {
    /// Focus, exposure and white balance.
    pub const ALL: Self = Self {
        af: true,
        ae: true,
        awb: true,
    };

    /// Returns true if no routine is selected.
    pub fn is_empty(&self) -> bool {
        !(self.af || self.ae || self.awb)
    }
}

impl Default for MeteringMode {
    fn default() -> Self {
        Self::ALL
    }
}

/// A single-shot focus and metering command.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusMeteringAction {
    points: Vec<(MeteringPoint, MeteringMode)>,
    auto_cancel: Option<Duration>,
}

impl FocusMeteringAction {
    /// Starts a builder with one point and the default modes.
    pub fn builder(point: MeteringPoint) -> FocusMeteringActionBuilder {
        FocusMeteringActionBuilder::new(point)
    }

    /// Returns the points and the routines each applies to.
    pub fn points(&self) -> &[(MeteringPoint, MeteringMode)] {
        &self.points
    }

    /// Returns the first metering point.
    pub fn primary_point(&self) -> MeteringPoint {
        // The builder cannot produce an empty action.
        self.points[0].0
    }

    /// Returns the auto-cancel duration, `None` if disabled.
    pub fn auto_cancel(&self) -> Option<Duration> {
        self.auto_cancel
    }
}

/// Builder for [`FocusMeteringAction`].
#[derive(Debug, Clone)]
pub struct FocusMeteringActionBuilder {
    points: Vec<(MeteringPoint, MeteringMode)>,
    auto_cancel: Option<Duration>,
}

impl FocusMeteringActionBuilder {
    fn new(point: MeteringPoint) -> Self {
        Self {
            points: vec![(point, MeteringMode::default())],
            auto_cancel: Some(DEFAULT_AUTO_CANCEL),
        }
    }

    /// Restricts the first point to the given routines.
    pub fn with_mode(mut self, mode: MeteringMode) -> Self {
        if !mode.is_empty() {
            self.points[0].1 = mode;
        }
        self
    }

    /// Adds another point.
    pub fn add_point(mut self, point: MeteringPoint, mode: MeteringMode) -> Self {
        if !mode.is_empty() {
            self.points.push((point, mode));
        }
        self
    }

    /// Sets the auto-cancel duration. A zero duration disables it.
    pub fn set_auto_cancel(mut self, duration: Duration) -> Self {
        self.auto_cancel = (!duration.is_zero()).then_some(duration);
        self
    }

    /// Builds the action.
    pub fn build(self) -> FocusMeteringAction {
        FocusMeteringAction {
            points: self.points,
            auto_cancel: self.auto_cancel,
        }
    }
}
