//! Tri-state occupancy grid.

use crate::core::{CellState, GridCoord, WorldPoint};
use crate::error::GridError;
use crate::grid::GridGeometry;

use super::types::{CellCounts, MapSnapshot};

/// Occupancy grid storing one [`CellState`] per cell.
///
/// The grid uses a coordinate system where:
/// - (0, 0) is at `origin` in world coordinates
/// - Positive X is to the right
/// - Positive Y is up
/// - Cell (x, y) covers `origin + x*cell_size` to `origin + (x+1)*cell_size`
///
/// Access outside `[0, width) × [0, height)` returns
/// [`GridError::OutOfBounds`]; coordinates are never clamped.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    geometry: GridGeometry,
    cells: Vec<CellState>,
}

impl OccupancyGrid {
    /// Create a grid with every cell Unknown.
    pub fn new(geometry: GridGeometry) -> Self {
        let cells = vec![CellState::Unknown; geometry.cell_count()];
        Self { geometry, cells }
    }

    /// Grid geometry.
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Grid width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.geometry.width()
    }

    /// Grid height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.geometry.height()
    }

    /// Native resolution in meters per native cell.
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.geometry.resolution()
    }

    /// Downsampling factor.
    #[inline]
    pub fn scale(&self) -> u32 {
        self.geometry.scale()
    }

    /// Stored cell edge length in meters.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.geometry.cell_size()
    }

    /// World coordinates of the corner of cell (0, 0).
    #[inline]
    pub fn origin(&self) -> WorldPoint {
        self.geometry.origin()
    }

    /// Get the state of a cell.
    #[inline]
    pub fn get(&self, coord: GridCoord) -> Result<CellState, GridError> {
        let index = self.geometry.check(coord)?;
        Ok(self.cells[index])
    }

    /// Set the state of a cell. Returns true if the state changed.
    #[inline]
    pub fn set(&mut self, coord: GridCoord, state: CellState) -> Result<bool, GridError> {
        let index = self.geometry.check(coord)?;
        Ok(self.set_index(index, state))
    }

    /// Get the state at a flat index (caller guarantees bounds).
    #[inline]
    pub(crate) fn get_index(&self, index: usize) -> CellState {
        self.cells[index]
    }

    #[inline]
    pub(crate) fn set_index(&mut self, index: usize, state: CellState) -> bool {
        let changed = self.cells[index] != state;
        self.cells[index] = state;
        changed
    }

    /// Set every cell to `state`.
    pub fn fill(&mut self, state: CellState) {
        self.cells.fill(state);
    }

    /// Reset every cell to Unknown.
    pub fn clear(&mut self) {
        self.fill(CellState::Unknown);
    }

    /// Iterate all cells with their coordinates in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCoord, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &state)| (self.geometry.index_to_coord(i), state))
    }

    /// Count cells by state.
    pub fn count_by_state(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for &state in &self.cells {
            counts.add(state);
        }
        counts
    }

    /// Copy the grid out in ROS occupancy encoding.
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            width: self.width(),
            height: self.height(),
            resolution: self.resolution(),
            scale: self.scale(),
            cell_size: self.cell_size(),
            origin: self.origin(),
            data: self.cells.iter().map(|s| s.to_ros_occupancy()).collect(),
        }
    }
}
