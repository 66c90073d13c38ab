//! Platform bounds settings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tracking::DEFAULT_AUTO_DETECT_MARGIN;

/// Manually configured platform cylinder plus auto-detection switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlatformConfig {
    /// Platform center (x, y, z). Default: origin
    pub center: [f64; 3],
    /// Horizontal radius (must be > 0). Default: 10.0
    pub radius: f64,
    /// Positions below this height are off the platform. Default: -5.0
    pub fall_threshold: f64,
    /// Derive bounds from the platform object at initialization. Default: true
    pub auto_detect_platform: bool,
    /// Distance below the platform box used as fall threshold. Default: 2.0
    pub auto_detect_margin: f64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            radius: 10.0,
            fall_threshold: -5.0,
            auto_detect_platform: true,
            auto_detect_margin: DEFAULT_AUTO_DETECT_MARGIN,
        }
    }
}
