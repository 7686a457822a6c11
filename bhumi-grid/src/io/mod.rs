//! Map export.
//!
//! ## ROS Export
//!
//! Export maps in ROS map_server format:
//!
//! ```rust,ignore
//! use bhumi_grid::io::export_ros_map;
//! use std::path::Path;
//!
//! // Creates map.pgm and map.yaml
//! export_ros_map(&layers.snapshot(), Path::new("map"))?;
//! ```

pub mod pgm;

pub use pgm::{MapYaml, export_pgm, export_ros_map, export_yaml, write_pgm};

/// Error type for I/O operations
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Data that cannot be written in the requested format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}
