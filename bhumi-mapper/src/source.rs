//! Map source: where the served map geometry comes from.

use bhumi_grid::MapInfo;
use tracing::info;

use crate::error::{MapperError, Result};

/// Provider of the served map's geometry, queried once at startup.
pub trait MapSource {
    /// Width, height, resolution and origin of the served map.
    fn map_info(&self) -> Result<MapInfo>;
}

/// Serves a fixed `MapInfo`, e.g. the one recorded in a replay scenario.
#[derive(Clone, Debug)]
pub struct StaticMapSource {
    info: MapInfo,
}

impl StaticMapSource {
    /// Serve `info` as-is; it is checked when queried.
    pub fn new(info: MapInfo) -> Self {
        Self { info }
    }
}

impl MapSource for StaticMapSource {
    fn map_info(&self) -> Result<MapInfo> {
        let info = self.info.clone();

        if info.width == 0 || info.height == 0 {
            return Err(MapperError::UpstreamUnavailable(format!(
                "served map is empty ({}x{})",
                info.width, info.height
            )));
        }
        if !info.resolution.is_finite() || info.resolution <= 0.0 {
            return Err(MapperError::UpstreamUnavailable(format!(
                "served map has invalid resolution {}",
                info.resolution
            )));
        }

        info!(
            "Served map: {}x{} @ {:.3}m, origin ({:.2}, {:.2})",
            info.width, info.height, info.resolution, info.origin.x, info.origin.y
        );
        Ok(info)
    }
}
