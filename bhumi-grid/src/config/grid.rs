//! Grid configuration section.

use serde::{Deserialize, Serialize};

use crate::core::WorldPoint;
use crate::grid::{GridGeometry, MapInfo};

use super::defaults;

/// Grid configuration section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    /// Native cells per stored cell along each axis
    #[serde(default = "defaults::scale")]
    pub scale: u32,

    /// Origin X override (meters); the served origin is used when unset
    #[serde(default)]
    pub origin_x: Option<f32>,

    /// Origin Y override (meters); the served origin is used when unset
    #[serde(default)]
    pub origin_y: Option<f32>,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            scale: defaults::scale(),
            origin_x: None,
            origin_y: None,
        }
    }
}

impl GridSection {
    /// Geometry for the served map with this section's scale and overrides.
    pub fn to_geometry(&self, served: &MapInfo) -> GridGeometry {
        let origin = WorldPoint::new(
            self.origin_x.unwrap_or(served.origin.x),
            self.origin_y.unwrap_or(served.origin.y),
        );
        let info = MapInfo {
            origin,
            ..served.clone()
        };
        GridGeometry::from_map_info(&info, self.scale)
    }
}
