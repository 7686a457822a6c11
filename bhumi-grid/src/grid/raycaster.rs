//! Discrete line traversal for marking free space.
//!
//! When a beam reports an obstacle at distance D, every cell between the
//! sensor and D has been seen through and is free. The traversal walks
//! those cells with integer Bresenham stepping:
//!
//! ```text
//! From (0,0) to (7,3):
//!
//!     3 │        ●
//!     2 │     ●●
//!     1 │  ●●
//!     0 ●●
//!       └──────────
//!        0 1 2 3 4 5 6 7
//! ```
//!
//! - No division, so horizontal, vertical and diagonal segments all work
//! - Consecutive cells are 4- or 8-adjacent (no gaps)
//! - A segment spanning `(dx, dy)` yields exactly `max(|dx|, |dy|) + 1` cells
//!
//! Coordinates are signed and unchecked; the caller decides what to do
//! with cells that fall outside the grid. Step arithmetic is done in `i64`
//! so any pair of `i32` cells can be walked.

use crate::core::{GridCoord, WorldPoint};

use super::GridGeometry;

/// Bresenham's line algorithm iterator.
///
/// Yields every cell from `start` to `end` inclusive, in order of
/// increasing distance from `start`.
#[derive(Clone, Debug)]
pub struct BresenhamLine {
    x: i64,
    y: i64,
    dx: i64,
    dy: i64,
    step_x: i64,
    step_y: i64,
    err: i64,
    remaining: usize,
}

impl BresenhamLine {
    /// Create a new Bresenham line iterator from start to end coordinates.
    pub fn new(start: GridCoord, end: GridCoord) -> Self {
        let dx = (i64::from(end.x) - i64::from(start.x)).abs();
        let dy = (i64::from(end.y) - i64::from(start.y)).abs();

        Self {
            x: start.x.into(),
            y: start.y.into(),
            dx,
            dy,
            step_x: if start.x < end.x { 1 } else { -1 },
            step_y: if start.y < end.y { 1 } else { -1 },
            err: dx - dy,
            remaining: dx.max(dy) as usize + 1,
        }
    }

    /// An iterator that yields nothing.
    pub fn empty() -> Self {
        Self {
            x: 0,
            y: 0,
            dx: 0,
            dy: 0,
            step_x: 1,
            step_y: 1,
            err: 0,
            remaining: 0,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = GridCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        // Every yielded cell lies between start and end, so it fits in i32
        let current = GridCoord::new(self.x as i32, self.y as i32);

        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.x += self.step_x;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.y += self.step_y;
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BresenhamLine {}

/// Collect all cells from `start` to `end`, both inclusive.
pub fn traverse(start: GridCoord, end: GridCoord) -> Vec<GridCoord> {
    BresenhamLine::new(start, end).collect()
}

/// Trace from the cell containing `origin` to the cell `distance` meters
/// away along `angle` (radians, map frame).
///
/// The segment is clipped to the grid rectangle first, so only the part
/// that crosses the grid is walked; a segment that misses the grid yields
/// nothing. A non-positive distance yields only the origin's cell.
pub fn traverse_polar(
    geometry: &GridGeometry,
    origin: WorldPoint,
    distance: f32,
    angle: f32,
) -> BresenhamLine {
    let end = origin.project(distance.max(0.0), angle);
    match geometry.clip_segment(origin, end) {
        Some((a, b)) => BresenhamLine::new(geometry.world_to_grid(a), geometry.world_to_grid(b)),
        None => BresenhamLine::empty(),
    }
}
