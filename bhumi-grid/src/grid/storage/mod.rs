//! Grid storage: the occupancy grid and its delta grid.
//!
//! ## Layout
//!
//! ```text
//!  MapLayers
//!  ├── OccupancyGrid   [F F ? ? O F ? ...]   Free / Occupied / Unknown
//!  └── DeltaGrid       [0 1 0 0 1 1 0 ...]   changed since last publish
//! ```
//!
//! Both layers share one [`GridGeometry`](crate::grid::GridGeometry) and are
//! always mutated together, so they live behind a single lock.
//!
//! ## Key Types
//!
//! - [`OccupancyGrid`]: Bounds-checked cell states
//! - [`DeltaGrid`]: Changed-cell flags, cleared once per publish cycle
//! - [`MapLayers`]: Both grids paired
//! - [`CellCounts`]: Statistics for each cell state

mod delta;
mod occupancy;
mod types;

pub use delta::DeltaGrid;
pub use occupancy::OccupancyGrid;
pub use types::{CellCounts, MapSnapshot, MapUpdate};

use crate::grid::{GridGeometry, MapInfo};

/// Occupancy grid and delta grid with the same geometry.
#[derive(Clone, Debug)]
pub struct MapLayers {
    /// Current cell states.
    pub grid: OccupancyGrid,
    /// Cells changed since the last publish.
    pub delta: DeltaGrid,
}

impl MapLayers {
    /// Create empty layers.
    pub fn new(geometry: GridGeometry) -> Self {
        Self {
            delta: DeltaGrid::new(geometry.clone()),
            grid: OccupancyGrid::new(geometry),
        }
    }

    /// Create empty layers for a served map downsampled by `scale`.
    pub fn from_map_info(info: &MapInfo, scale: u32) -> Self {
        Self::new(GridGeometry::from_map_info(info, scale))
    }

    /// Shared geometry.
    #[inline]
    pub fn geometry(&self) -> &GridGeometry {
        self.grid.geometry()
    }

    /// Collect this cycle's changes and clear the delta grid.
    pub fn take_update(&mut self, sequence: u64) -> MapUpdate {
        let changed: Vec<_> = self
            .delta
            .changed_indices()
            .map(|i| (self.geometry().index_to_coord(i), self.grid.get_index(i)))
            .collect();
        self.delta.clear();

        MapUpdate {
            sequence,
            grid_changed: !changed.is_empty(),
            changed,
            counts: self.grid.count_by_state(),
        }
    }

    /// Full copy of the occupancy grid.
    pub fn snapshot(&self) -> MapSnapshot {
        self.grid.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CellState, GridCoord, WorldPoint};

    #[test]
    fn test_take_update_clears_delta() {
        let info = MapInfo {
            width: 10,
            height: 10,
            resolution: 1.0,
            origin: WorldPoint::ZERO,
        };
        let mut layers = MapLayers::from_map_info(&info, 1);

        let c = GridCoord::new(3, 2);
        layers.grid.set(c, CellState::Occupied).unwrap();
        layers.delta.mark(c).unwrap();

        let update = layers.take_update(1);
        assert!(update.grid_changed);
        assert_eq!(update.changed, vec![(c, CellState::Occupied)]);
        assert_eq!(update.counts.occupied, 1);
        assert!(layers.delta.is_empty());

        let empty = layers.take_update(2);
        assert!(!empty.grid_changed);
        assert!(empty.changed.is_empty());
        assert_eq!(empty.counts.occupied, 1);
    }
}
