//! Map sinks: consumers of published map updates.

use std::path::PathBuf;

use bhumi_grid::io::export_ros_map;
use bhumi_grid::{MapSnapshot, MapUpdate};
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::error::Result;

/// Consumer of the periodic map updates.
pub trait MapSink: Send {
    /// Called once per publish cycle.
    fn publish(&mut self, update: &MapUpdate) -> Result<()>;

    /// Called once at shutdown with the final grid.
    fn finish(&mut self, snapshot: &MapSnapshot) -> Result<()>;
}

/// Logs each update and exports the final grid as a ROS map.
#[derive(Clone, Debug, Default)]
pub struct LogSink {
    map_path: Option<PathBuf>,
}

impl LogSink {
    /// Sink that exports the final grid to `{map_path}.pgm` / `.yaml`.
    pub fn new(map_path: impl Into<PathBuf>) -> Self {
        Self {
            map_path: Some(map_path.into()),
        }
    }

    /// Sink that only logs.
    pub fn log_only() -> Self {
        Self { map_path: None }
    }

    /// Sink for the `[output]` section. An empty `map_path` disables export.
    pub fn from_output(output: &OutputConfig) -> Self {
        if output.map_path.is_empty() {
            info!("No output map_path configured, final map will not be exported");
            Self::log_only()
        } else {
            Self::new(&output.map_path)
        }
    }
}

impl MapSink for LogSink {
    fn publish(&mut self, update: &MapUpdate) -> Result<()> {
        if update.grid_changed {
            info!(
                "[Publish #{}] grid has changed: {} cells, {:.1}% explored",
                update.sequence,
                update.changed.len(),
                update.counts.explored_fraction() * 100.0
            );
        } else {
            debug!("[Publish #{}] no changes", update.sequence);
        }
        Ok(())
    }

    fn finish(&mut self, snapshot: &MapSnapshot) -> Result<()> {
        let Some(map_path) = &self.map_path else {
            return Ok(());
        };

        if let Some(parent) = map_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let (pgm, yaml) = export_ros_map(snapshot, map_path)?;
        info!("Map saved to {:?} and {:?}", pgm, yaml);
        Ok(())
    }
}
