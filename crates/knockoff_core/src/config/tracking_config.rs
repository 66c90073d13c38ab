//! Tick scheduling settings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TrackingConfig {
    /// Minimum host seconds between processed ticks (0 = every tick). Default: 0.0
    pub check_interval_seconds: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: 0.0,
        }
    }
}
