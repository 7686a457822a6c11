//! Configuration loading for the Bhumi mapper daemon

use std::path::{Path, PathBuf};
use std::time::Duration;

use bhumi_grid::MapperConfig;
use serde::Deserialize;
use tracing::info;

use crate::error::{MapperError, Result};

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NodeConfig {
    /// Path to a mapper YAML file; replaces the inline `[mapper]` sections when set
    #[serde(default)]
    pub mapper_file: Option<PathBuf>,

    /// Inline mapper sections (`[mapper.grid]`, `[mapper.stability]`, ...)
    #[serde(default)]
    pub mapper: MapperConfig,

    /// Publish cadence
    #[serde(default)]
    pub publish: PublishConfig,

    /// Final map export
    #[serde(default)]
    pub output: OutputConfig,

    /// Scenario used when `--scenario` is not given
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Map publication settings
#[derive(Clone, Debug, Deserialize)]
pub struct PublishConfig {
    /// Publish period in milliseconds (default: 1000)
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

/// Output configuration
#[derive(Clone, Debug, Deserialize)]
pub struct OutputConfig {
    /// Base path of the exported map; `.pgm` and `.yaml` are appended
    #[serde(default = "default_map_path")]
    pub map_path: String,
}

/// Stream replay settings
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReplayConfig {
    /// Scenario file replayed when none is given on the command line
    #[serde(default)]
    pub scenario: Option<PathBuf>,
}

fn default_period_ms() -> u64 {
    1000
}

fn default_map_path() -> String {
    "output/map".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            map_path: default_map_path(),
        }
    }
}

impl PublishConfig {
    /// Publish period as a duration.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MapperError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string, resolving `mapper_file` if present
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: NodeConfig = toml::from_str(content)?;
        if let Some(path) = &config.mapper_file {
            info!("Loading mapper configuration from {:?}", path);
            config.mapper = MapperConfig::load(path)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot drive the daemon
    pub fn validate(&self) -> Result<()> {
        self.mapper.validate()?;
        if self.publish.period_ms == 0 {
            return Err(MapperError::Config(
                "publish.period_ms must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
