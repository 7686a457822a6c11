//! Error types for the Bhumi mapper daemon

use bhumi_grid::{ConfigLoadError, GridError};
use bhumi_grid::io::IoError;
use thiserror::Error;

/// Mapper daemon error type
#[derive(Error, Debug)]
pub enum MapperError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Replay error: {0}")]
    Replay(String),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Export error: {0}")]
    Export(#[from] IoError),
}

impl From<toml::de::Error> for MapperError {
    fn from(e: toml::de::Error) -> Self {
        MapperError::Config(e.to_string())
    }
}

impl From<ConfigLoadError> for MapperError {
    fn from(e: ConfigLoadError) -> Self {
        MapperError::Config(e.to_string())
    }
}

impl From<serde_yaml::Error> for MapperError {
    fn from(e: serde_yaml::Error) -> Self {
        MapperError::Replay(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
