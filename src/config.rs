//! Viewfinder configuration.
//!
//! Loaded from a TOML file with `[focus]`, `[preview]` and `[output]`
//! sections. Every field has a default, so an empty file is valid.

use crate::capture::Resolution;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tap-to-focus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// How long the auto-focus indicator stays visible after a tap.
    pub indicator_timeout_ms: u64,
    /// Metering region size as a fraction of the frame (0, 1].
    pub metering_point_size: f32,
    /// Delay before the lens returns to continuous focus, 0 to disable.
    pub auto_cancel_ms: u64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            indicator_timeout_ms: 1000,
            metering_point_size: 0.15,
            auto_cancel_ms: 5000,
        }
    }
}

impl FocusConfig {
    /// Returns the indicator timeout as a [`Duration`].
    pub fn indicator_timeout(&self) -> Duration {
        Duration::from_millis(self.indicator_timeout_ms)
    }

    /// Returns the auto-cancel delay as a [`Duration`].
    pub fn auto_cancel(&self) -> Duration {
        Duration::from_millis(self.auto_cancel_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indicator_timeout_ms == 0 {
            return Err(ConfigError::InvalidIndicatorTimeout);
        }
        if !(self.metering_point_size > 0.0 && self.metering_point_size <= 1.0) {
            return Err(ConfigError::InvalidPointSize(self.metering_point_size));
        }
        Ok(())
    }
}

/// Resolution the demo pipeline announces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl PreviewConfig {
    /// Returns the configured resolution.
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Validates the preview dimensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.resolution().is_valid() {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Demo run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How long the session stays bound before the scope ends.
    pub duration_ms: u64,
    /// Number of simulated taps.
    pub taps: u32,
    /// Delay between simulated taps.
    pub tap_interval_ms: u64,
    /// Print Prometheus metrics on exit.
    pub print_metrics: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            duration_ms: 3000,
            taps: 3,
            tap_interval_ms: 300,
            print_metrics: true,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Preview width or height is zero.
    #[error("invalid preview dimensions")]
    InvalidDimensions,
    /// Indicator timeout is zero.
    #[error("indicator timeout must be non-zero")]
    InvalidIndicatorTimeout,
    /// Metering point size outside (0, 1].
    #[error("invalid metering point size {0} (must be in (0, 1])")]
    InvalidPointSize(f32),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Tap-to-focus settings.
    #[serde(default)]
    pub focus: FocusConfig,
    /// Preview pipeline settings.
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Demo run settings.
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.focus.validate()?;
        self.preview.validate()
    }
}
