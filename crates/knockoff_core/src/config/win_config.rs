//! Win condition settings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WinConfig {
    /// Tracked population below this never wins. Default: 1
    pub minimum_objects_to_track: usize,
}

impl Default for WinConfig {
    fn default() -> Self {
        Self {
            minimum_objects_to_track: 1,
        }
    }
}
