//! Types produced by grid storage.

use serde::{Deserialize, Serialize};

use crate::core::{CellState, GridCoord, WorldPoint};

/// Cell counts by state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    /// Free cells.
    pub free: usize,
    /// Occupied cells.
    pub occupied: usize,
    /// Unknown cells (not yet observed).
    pub unknown: usize,
}

impl CellCounts {
    /// Total known cells.
    pub fn known(&self) -> usize {
        self.free + self.occupied
    }

    /// Total cells.
    pub fn total(&self) -> usize {
        self.unknown + self.known()
    }

    /// Fraction of cells that have been observed (0.0 - 1.0).
    pub fn explored_fraction(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.known() as f32 / total as f32
        }
    }

    pub(crate) fn add(&mut self, state: CellState) {
        match state {
            CellState::Free => self.free += 1,
            CellState::Occupied => self.occupied += 1,
            CellState::Unknown => self.unknown += 1,
        }
    }
}

/// Full copy of the grid for consumers, in ROS occupancy encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Width (cells).
    pub width: usize,
    /// Height (cells).
    pub height: usize,
    /// Native resolution (meters/cell).
    pub resolution: f32,
    /// Downsampling factor.
    pub scale: u32,
    /// Stored cell edge length (meters).
    pub cell_size: f32,
    /// World position of the corner of cell (0, 0).
    pub origin: WorldPoint,
    /// Row-major cells: 0 free, 100 occupied, -1 unknown.
    pub data: Vec<i8>,
}

impl MapSnapshot {
    /// Cell state at `coord`, or `None` outside the snapshot.
    pub fn state(&self, coord: GridCoord) -> Option<CellState> {
        if coord.x < 0
            || coord.y < 0
            || coord.x as usize >= self.width
            || coord.y as usize >= self.height
        {
            return None;
        }
        let index = coord.y as usize * self.width + coord.x as usize;
        self.data
            .get(index)
            .map(|&v| CellState::from_ros_occupancy(v))
    }
}

/// Changes accumulated over one publish cycle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapUpdate {
    /// Publish cycle number.
    pub sequence: u64,
    /// True if any cell changed since the previous cycle.
    pub grid_changed: bool,
    /// Changed cells with their current state, in row-major order.
    pub changed: Vec<(GridCoord, CellState)>,
    /// Coverage of the whole grid after this cycle.
    pub counts: CellCounts,
}
