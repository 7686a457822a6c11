//! Change tracking between publish cycles.

use crate::core::GridCoord;
use crate::error::GridError;
use crate::grid::GridGeometry;

/// Per-cell "changed since last publish" flags.
///
/// Flags only ever go from false to true between clears. The publisher
/// clears the whole grid once per cycle after reading it.
#[derive(Clone, Debug)]
pub struct DeltaGrid {
    geometry: GridGeometry,
    changed: Vec<bool>,
    count: usize,
}

impl DeltaGrid {
    /// Create a delta grid with no changes recorded.
    pub fn new(geometry: GridGeometry) -> Self {
        let changed = vec![false; geometry.cell_count()];
        Self {
            geometry,
            changed,
            count: 0,
        }
    }

    /// Grid geometry.
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Record a change at `coord`.
    pub fn mark(&mut self, coord: GridCoord) -> Result<(), GridError> {
        let index = self.geometry.check(coord)?;
        self.mark_index(index);
        Ok(())
    }

    #[inline]
    pub(crate) fn mark_index(&mut self, index: usize) {
        if !self.changed[index] {
            self.changed[index] = true;
            self.count += 1;
        }
    }

    /// True if `coord` changed since the last clear.
    pub fn is_changed(&self, coord: GridCoord) -> Result<bool, GridError> {
        let index = self.geometry.check(coord)?;
        Ok(self.changed[index])
    }

    /// Number of changed cells.
    #[inline]
    pub fn changed_count(&self) -> usize {
        self.count
    }

    /// True if nothing changed since the last clear.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Flat indices of changed cells, ascending.
    pub(crate) fn changed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.changed
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| c.then_some(i))
    }

    /// Coordinates of changed cells in row-major order.
    pub fn changed_coords(&self) -> Vec<GridCoord> {
        self.changed_indices()
            .map(|i| self.geometry.index_to_coord(i))
            .collect()
    }

    /// Forget all recorded changes.
    pub fn clear(&mut self) {
        if self.count > 0 {
            self.changed.fill(false);
            self.count = 0;
        }
    }
}
