//! Main MapperConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::gate::StabilityConfig;
use crate::grid::{IntegrationConfig, ScanIntegrator};

use super::defaults;
use super::error::ConfigLoadError;
use super::grid::GridSection;

/// Full mapper configuration loaded from YAML
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct MapperConfig {
    /// Grid settings
    #[serde(default)]
    pub grid: GridSection,

    /// Scan integration settings
    #[serde(default)]
    pub integration: IntegrationConfig,

    /// Pose stability gate settings
    #[serde(default)]
    pub stability: StabilityConfig,
}

impl MapperConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/mapper.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(defaults::config_path());
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string and validate
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot drive the mapper
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let invalid = |msg: String| Err(ConfigLoadError::Invalid(msg));

        if self.grid.scale == 0 {
            return invalid("grid.scale must be at least 1".into());
        }
        let margin = self.integration.free_space_margin;
        if !margin.is_finite() || margin < 0.0 {
            return invalid(format!(
                "integration.free_space_margin must be >= 0, got {margin}"
            ));
        }
        let s = &self.stability;
        if !s.wait_seconds.is_finite() || s.wait_seconds < 0.0 {
            return invalid(format!(
                "stability.wait_seconds must be >= 0, got {}",
                s.wait_seconds
            ));
        }
        let positive = |v: f32| v > 0.0;
        if !positive(s.max_position_delta) || !positive(s.max_heading_delta_degrees) {
            return invalid("stability thresholds must be positive".into());
        }
        Ok(())
    }

    /// Build the scan integrator
    pub fn integrator(&self) -> ScanIntegrator {
        ScanIntegrator::new(self.integration.clone())
    }
}
