//! Mapper configuration loading.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bhumi_grid::config::MapperConfig;
//!
//! // Load from default path (configs/mapper.yaml)
//! let config = MapperConfig::load_default()?;
//!
//! // Or use built-in defaults (no file needed)
//! let config = MapperConfig::default();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Downsampling scale, origin override |
//! | `integration` | Free-space margin |
//! | `stability` | Stability gate wait and thresholds |
//!
//! ## Example YAML
//!
//! ```yaml
//! grid:
//!   scale: 5                        # 5x5 native cells per stored cell
//!
//! integration:
//!   free_space_margin: 0.1          # meters short of each hit
//!
//! stability:
//!   wait_seconds: 0.2
//!   max_position_delta: 0.001       # meters, per axis
//!   max_heading_delta_degrees: 0.1
//!   wrap_heading: true
//! ```

mod defaults;
mod error;
mod grid;
mod mapper;

pub use error::ConfigLoadError;
pub use grid::GridSection;
pub use mapper::MapperConfig;
