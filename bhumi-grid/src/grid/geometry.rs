//! Coordinate transform between the map frame and grid cells.
//!
//! The served map is described at its native resolution. Bhumi stores a
//! coarser grid: one stored cell covers `scale × scale` native cells, so
//! the effective cell size is `resolution × scale`.
//!
//! ```text
//!   world (m)                         grid (cells)
//!   p ──▶ floor((p - origin) / cell_size) ──▶ (col, row)
//!   (col, row) ──▶ origin + (c + 0.5) * cell_size ──▶ cell center
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{GridCoord, WorldPoint};
use crate::error::GridError;

/// Description of the served map at native resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Width in native cells.
    pub width: usize,
    /// Height in native cells.
    pub height: usize,
    /// Native resolution (meters/cell).
    pub resolution: f32,
    /// World position of the corner of native cell (0, 0).
    #[serde(default)]
    pub origin: WorldPoint,
}

/// Dimensions and placement of the stored grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridGeometry {
    width: usize,
    height: usize,
    resolution: f32,
    scale: u32,
    origin: WorldPoint,
    cell_size: f32,
    /// Pre-computed 1.0 / cell_size for faster world-to-grid conversion.
    inv_cell_size: f32,
}

impl GridGeometry {
    /// Create a geometry with the given stored dimensions.
    ///
    /// A `scale` of 0 is treated as 1.
    pub fn new(width: usize, height: usize, resolution: f32, scale: u32, origin: WorldPoint) -> Self {
        let scale = scale.max(1);
        let cell_size = resolution * scale as f32;
        Self {
            width,
            height,
            resolution,
            scale,
            origin,
            cell_size,
            inv_cell_size: 1.0 / cell_size,
        }
    }

    /// Downsample a served map by `scale`.
    ///
    /// Stored dimensions round up so the whole native map is covered.
    pub fn from_map_info(info: &MapInfo, scale: u32) -> Self {
        let scale = scale.max(1);
        let s = scale as usize;
        Self::new(
            info.width.div_ceil(s),
            info.height.div_ceil(s),
            info.resolution,
            scale,
            info.origin,
        )
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Native resolution in meters per native cell.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Downsampling factor.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Edge length of a stored cell in meters.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World coordinates of the corner of cell (0, 0).
    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.origin
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// World bounds: (min_point, max_point).
    pub fn bounds(&self) -> (WorldPoint, WorldPoint) {
        let min = self.origin;
        let max = WorldPoint::new(
            self.origin.x + self.width as f32 * self.cell_size,
            self.origin.y + self.height as f32 * self.cell_size,
        );
        (min, max)
    }

    /// Clip the segment `a → b` to the grid rectangle (Liang-Barsky).
    ///
    /// Returns the part of the segment inside the rectangle, or `None` if
    /// the segment misses it or either end is not finite. The part keeps the
    /// segment's direction, and both ends lie within [`bounds`](Self::bounds).
    pub fn clip_segment(&self, a: WorldPoint, b: WorldPoint) -> Option<(WorldPoint, WorldPoint)> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        let (min, max) = self.bounds();
        let (ax, ay) = (f64::from(a.x), f64::from(a.y));
        let (dx, dy) = (f64::from(b.x) - ax, f64::from(b.y) - ay);

        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;
        let edges = [
            (-dx, ax - f64::from(min.x)),
            (dx, f64::from(max.x) - ax),
            (-dy, ay - f64::from(min.y)),
            (dy, f64::from(max.y) - ay),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }

        // Rounding on huge segments can land just outside; pull back onto the edge
        let at = |t: f64| {
            WorldPoint::new(
                ((ax + t * dx) as f32).clamp(min.x, max.x),
                ((ay + t * dy) as f32).clamp(min.y, max.y),
            )
        };
        Some((at(t0), at(t1)))
    }

    /// Convert world coordinates to grid coordinates without bounds checks.
    ///
    /// The result may lie outside the grid; ray endpoints use this so a
    /// beam leaving the map can still be walked up to the edge.
    #[inline]
    pub fn world_to_grid(&self, point: WorldPoint) -> GridCoord {
        let x = ((point.x - self.origin.x) * self.inv_cell_size).floor() as i32;
        let y = ((point.y - self.origin.y) * self.inv_cell_size).floor() as i32;
        GridCoord::new(x, y)
    }

    /// Convert world coordinates to an in-bounds cell.
    pub fn to_cell(&self, point: WorldPoint) -> Result<GridCoord, GridError> {
        if !point.is_finite() {
            return Err(GridError::TransformFailure(format!(
                "point ({}, {}) is not finite",
                point.x, point.y
            )));
        }
        let coord = self.world_to_grid(point);
        self.check(coord)?;
        Ok(coord)
    }

    /// Convert grid coordinates to world coordinates (cell center).
    #[inline]
    pub fn cell_center(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.cell_size,
            self.origin.y + (coord.y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Check if grid coordinates are within bounds.
    #[inline]
    pub fn is_valid_coord(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height
    }

    /// Convert grid coordinates to flat array index.
    #[inline]
    pub fn coord_to_index(&self, coord: GridCoord) -> Option<usize> {
        if self.is_valid_coord(coord) {
            Some(coord.y as usize * self.width + coord.x as usize)
        } else {
            None
        }
    }

    /// Like [`coord_to_index`](Self::coord_to_index) but reports the failure.
    #[inline]
    pub fn check(&self, coord: GridCoord) -> Result<usize, GridError> {
        self.coord_to_index(coord).ok_or(GridError::OutOfBounds {
            x: coord.x,
            y: coord.y,
            width: self.width,
            height: self.height,
        })
    }

    /// Convert flat array index to grid coordinates.
    #[inline]
    pub fn index_to_coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }
}
