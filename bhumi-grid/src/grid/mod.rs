//! Occupancy grid implementation.
//!
//! ## Architecture
//!
//! ```text
//!   LaserScan + Pose2D (accepted by the stability gate)
//!             │
//!             ▼
//!   ┌───────────────────┐   world → cell   ┌────────────────┐
//!   │   scan_update     │ ───────────────▶ │  GridGeometry  │
//!   │  (ScanIntegrator) │                  └────────────────┘
//!   │                   │   cell → cells   ┌────────────────┐
//!   │                   │ ───────────────▶ │   raycaster    │
//!   └─────────┬─────────┘                  └────────────────┘
//!             ▼
//!   ┌───────────────────┐
//!   │     MapLayers     │  OccupancyGrid + DeltaGrid
//!   └───────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`GridGeometry`]: Coordinate transform for a scaled grid
//! - [`OccupancyGrid`] / [`DeltaGrid`]: Cell states and change flags
//! - [`ScanIntegrator`]: Free-ray and endpoint updates from one scan
//! - [`raycaster`]: Bresenham line traversal
//!
//! ## Example
//!
//! ```rust,ignore
//! use bhumi_grid::grid::{MapLayers, MapInfo, ScanIntegrator};
//!
//! let mut layers = MapLayers::from_map_info(&map_info, 5);
//! let result = ScanIntegrator::default().integrate(&mut layers, &scan, pose);
//! if result.changed {
//!     let update = layers.take_update(seq);
//! }
//! ```

mod config;
mod geometry;
pub mod raycaster;
pub mod scan_update;
mod storage;

pub use config::IntegrationConfig;
pub use geometry::{GridGeometry, MapInfo};
pub use scan_update::{IntegrateResult, ScanIntegrator};
pub use storage::{CellCounts, DeltaGrid, MapLayers, MapSnapshot, MapUpdate, OccupancyGrid};
