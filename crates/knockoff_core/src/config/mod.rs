//! # Tracker Configuration
//!
//! All host-facing settings in one serde document, split into sections.
//!
//! ```rust
//! use knockoff_core::config::TrackerConfig;
//!
//! let config = TrackerConfig::default();
//! let throttled = TrackerConfig::throttled(0.25);
//! assert!(config.validate().is_ok() && throttled.validate().is_ok());
//! ```

mod platform_config;
mod tracking_config;
mod win_config;

pub use platform_config::PlatformConfig;
pub use tracking_config::TrackingConfig;
pub use win_config::WinConfig;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, TrackerError};
use crate::tracking::{point, PlatformBounds, Point3};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct TrackerConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub win: WinConfig,
}

impl TrackerConfig {
    /// Classify on every tick (the default).
    pub fn every_tick() -> Self {
        Self::default()
    }

    /// Classify at most once per `interval` seconds.
    pub fn throttled(interval: f64) -> Self {
        let mut cfg = Self::default();
        cfg.tracking.check_interval_seconds = interval;
        cfg
    }

    /// Fixed bounds with auto-detection off.
    pub fn manual_bounds(center: Point3, radius: f64, fall_threshold: f64) -> Self {
        let mut cfg = Self::default();
        cfg.platform.center = [center.x, center.y, center.z];
        cfg.platform.radius = radius;
        cfg.platform.fall_threshold = fall_threshold;
        cfg.platform.auto_detect_platform = false;
        cfg
    }

    /// Bounds described by the platform section.
    pub fn bounds(&self) -> Result<PlatformBounds> {
        PlatformBounds::new(
            point(self.platform.center),
            self.platform.radius,
            self.platform.fall_threshold,
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.bounds()?;

        let margin = self.platform.auto_detect_margin;
        if !margin.is_finite() || margin < 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "auto_detect_margin must be finite and >= 0, got {}",
                margin
            )));
        }

        let interval = self.tracking.check_interval_seconds;
        if !interval.is_finite() || interval < 0.0 {
            return Err(TrackerError::InvalidConfig(format!(
                "check_interval_seconds must be finite and >= 0, got {}",
                interval
            )));
        }

        Ok(())
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load by extension: `.yaml`/`.yml` as YAML, anything else as JSON.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        if is_yaml_path(path) {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str());
    matches!(ext, Some("yaml") | Some("yml"))
}

// ========== Tests ==========
