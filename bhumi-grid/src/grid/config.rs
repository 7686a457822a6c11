//! Configuration types for grid updates.

use serde::{Deserialize, Serialize};

/// Scan integration configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Distance short of a hit where the free ray stops (meters).
    ///
    /// Keeps the cell in front of an obstacle from being cleared by range
    /// noise. Also applied to misses, whose free ray ends at
    /// `range_max - free_space_margin`.
    ///
    /// Default: 0.1 meters
    #[serde(default = "default_free_space_margin")]
    pub free_space_margin: f32,
}

fn default_free_space_margin() -> f32 {
    0.1
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            free_space_margin: default_free_space_margin(),
        }
    }
}
