//! # Bhumi Grid
//!
//! Incremental 2D occupancy grid mapping from range scans and a live pose.
//!
//! ## Overview
//!
//! Every cell of the grid is in one of three states:
//!
//! - **Unknown** - Not yet observed
//! - **Free** - A beam passed through it
//! - **Occupied** - A beam ended in it
//!
//! Observations overwrite cells directly; there is no accumulated evidence.
//!
//! ## Pipeline
//!
//! ```text
//!  pose stream ──▶ StabilityGate ──▶ (scan, pose) ──▶ ScanIntegrator ──▶ MapLayers
//!                  sample, wait,                      free rays +         grid +
//!                  resample                           endpoints           delta
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bhumi_grid::{LaserScan, MapLayers, MapInfo, Pose2D, ScanIntegrator};
//!
//! let mut layers = MapLayers::from_map_info(&map_info, 5);
//! let integrator = ScanIntegrator::default();
//!
//! let result = integrator.integrate(&mut layers, &scan, Pose2D::new(1.0, 2.0, 0.0));
//! println!("{} cells changed", result.cells_changed());
//! ```
//!
//! ## Coordinate System
//!
//! Uses ROS REP-103 convention:
//! - X: Forward (positive ahead of robot)
//! - Y: Left (positive to robot's left)
//! - Theta: Rotation in radians, CCW positive from +X axis

#![warn(missing_docs)]

// Core types
pub mod core;

// Error types
pub mod error;

// Pose stability gate
pub mod gate;

// Grid storage, geometry and scan integration
pub mod grid;

// Configuration
pub mod config;

// Map export
pub mod io;

// Re-export commonly used types
pub use core::{CellState, GridCoord, LaserScan, Pose2D, Quaternion, WorldPoint};

pub use error::GridError;

pub use gate::{
    GateOutcome, GatePhase, GateStats, RejectReason, StabilityConfig, StabilityGate,
    SubmitOutcome,
};

pub use grid::{
    CellCounts, DeltaGrid, GridGeometry, IntegrateResult, IntegrationConfig, MapInfo, MapLayers,
    MapSnapshot, MapUpdate, OccupancyGrid, ScanIntegrator,
};

pub use config::{ConfigLoadError, MapperConfig};
