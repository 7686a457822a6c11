//! Coordinate primitives: continuous world points and discrete grid cells.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Integer cell index on the occupancy grid.
///
/// Signed so that ray endpoints beyond the grid edge can still be
/// represented and walked; bounds are checked when a cell is accessed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl GridCoord {
    /// Create a new grid coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (max of axis deltas) to another cell.
    #[inline]
    pub fn chebyshev_distance(&self, other: &GridCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// True if `other` shares an edge or a corner with this cell.
    #[inline]
    pub fn is_adjacent(&self, other: &GridCoord) -> bool {
        self.chebyshev_distance(other) == 1
    }
}

impl Add for GridCoord {
    type Output = GridCoord;

    fn add(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridCoord {
    type Output = GridCoord;

    fn sub(self, rhs: GridCoord) -> GridCoord {
        GridCoord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Point in the map's fixed frame, in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// X coordinate (meters).
    pub x: f32,
    /// Y coordinate (meters).
    pub y: f32,
}

impl WorldPoint {
    /// The frame origin.
    pub const ZERO: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    /// Create a new world point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point reached by travelling `distance` meters along `angle` (radians).
    #[inline]
    pub fn project(&self, distance: f32, angle: f32) -> WorldPoint {
        let (sin_a, cos_a) = angle.sin_cos();
        WorldPoint::new(self.x + distance * cos_a, self.y + distance * sin_a)
    }

    /// Both components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_project_along_axes() {
        let origin = WorldPoint::new(5.0, 5.0);

        let east = origin.project(3.0, 0.0);
        assert_relative_eq!(east.x, 8.0, epsilon = 1e-6);
        assert_relative_eq!(east.y, 5.0, epsilon = 1e-6);

        let north = origin.project(2.0, std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(north.x, 5.0, epsilon = 1e-6);
        assert_relative_eq!(north.y, 7.0, epsilon = 1e-6);
    }

    #[test]
    fn test_adjacency() {
        let c = GridCoord::new(3, 3);
        assert!(c.is_adjacent(&GridCoord::new(4, 3)));
        assert!(c.is_adjacent(&GridCoord::new(2, 2)));
        assert!(!c.is_adjacent(&GridCoord::new(3, 3)));
        assert!(!c.is_adjacent(&GridCoord::new(5, 3)));
    }
}
