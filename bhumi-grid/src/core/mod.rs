//! Core types for the Bhumi mapper.
//!
//! All types follow the ROS REP-103 coordinate convention:
//! - **X-axis**: Forward (positive ahead of robot)
//! - **Y-axis**: Left (positive to robot's left)
//! - **Theta**: Counter-clockwise rotation from +X axis (radians)
//!
//! ## Type Categories
//!
//! ### Coordinates
//! - [`GridCoord`]: Signed integer cell indices
//! - [`WorldPoint`]: Floating-point map-frame coordinates in meters
//!
//! ### Robot State
//! - [`Pose2D`]: Robot position (x, y) and heading (theta)
//! - [`Quaternion`]: Orientation as delivered by the pose stream
//!
//! ### Grid Cells
//! - [`CellState`]: Free / Occupied / Unknown
//!
//! ### Sensors
//! - [`LaserScan`]: One sweep of range readings in polar form

mod cell;
mod point;
mod pose;
mod sensors;

pub use cell::CellState;
pub use point::{GridCoord, WorldPoint};
pub use pose::{Pose2D, Quaternion, normalize_angle, normalize_degrees};
pub use sensors::LaserScan;
