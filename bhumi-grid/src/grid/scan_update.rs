//! Laser scan integration into the occupancy grid.
//!
//! For each beam of an accepted scan:
//! - Cells from the sensor to just short of the reading are marked Free
//! - The cell containing a valid reading is marked Occupied
//! - A miss (invalid reading) clears space out to `range_max`
//!
//! Writes follow beam order with last-write-wins per cell. Within one beam
//! the free ray is written before the endpoint, so a beam never erases its
//! own hit. All writes are merged before they touch the grid; a cell counts
//! as changed only if its final state differs from before the scan, which
//! makes integrating the same scan twice a no-op.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::core::{CellState, LaserScan, Pose2D};
use crate::error::GridError;
use crate::grid::config::IntegrationConfig;
use crate::grid::raycaster::traverse_polar;
use crate::grid::storage::MapLayers;

/// Result of integrating one scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrateResult {
    /// True if any cell changed state.
    pub changed: bool,
    /// Cells that became Free.
    pub cells_free: usize,
    /// Cells that became Occupied.
    pub cells_occupied: usize,
    /// Beams traced.
    pub beams: usize,
    /// Beams skipped for bad geometry.
    pub beams_skipped: usize,
    /// Ray cells and endpoints that fell outside the grid.
    pub points_out_of_bounds: usize,
}

impl IntegrateResult {
    /// Total cells that changed state.
    #[inline]
    pub fn cells_changed(&self) -> usize {
        self.cells_free + self.cells_occupied
    }

}

/// Applies accepted scans to [`MapLayers`].
#[derive(Clone, Debug, Default)]
pub struct ScanIntegrator {
    config: IntegrationConfig,
}

impl ScanIntegrator {
    /// Create an integrator with the given configuration.
    pub fn new(config: IntegrationConfig) -> Self {
        Self { config }
    }

    /// Integration configuration.
    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// Integrate `scan`, taken at `pose`, into `layers`.
    ///
    /// Changed cells are recorded in the delta grid. A scan or pose with
    /// non-finite header fields is skipped whole; a single bad beam is
    /// skipped without affecting the others.
    pub fn integrate(&self, layers: &mut MapLayers, scan: &LaserScan, pose: Pose2D) -> IntegrateResult {
        let mut result = IntegrateResult::default();

        if let Err(e) = Self::check_inputs(scan, &pose) {
            warn!("[Integrate] scan skipped: {}", e);
            result.beams_skipped = scan.len();
            return result;
        }

        let writes = self.collect_writes(layers, scan, pose, &mut result);

        for (index, state) in writes {
            if layers.grid.set_index(index, state) {
                layers.delta.mark_index(index);
                match state {
                    CellState::Free => result.cells_free += 1,
                    CellState::Occupied => result.cells_occupied += 1,
                    CellState::Unknown => {}
                }
            }
        }
        result.changed = result.cells_changed() > 0;

        debug!(
            "[Integrate] {} beams ({} valid, {} skipped): {} free, {} occupied, {} out of bounds",
            result.beams,
            scan.valid_count(),
            result.beams_skipped,
            result.cells_free,
            result.cells_occupied,
            result.points_out_of_bounds
        );

        result
    }

    fn check_inputs(scan: &LaserScan, pose: &Pose2D) -> Result<(), GridError> {
        if !pose.is_finite() {
            return Err(GridError::TransformFailure(format!(
                "pose is not finite: ({}, {}, {})",
                pose.x, pose.y, pose.theta
            )));
        }
        scan.validate()
    }

    /// Final state per flat index after applying every beam in order.
    fn collect_writes(
        &self,
        layers: &MapLayers,
        scan: &LaserScan,
        pose: Pose2D,
        result: &mut IntegrateResult,
    ) -> HashMap<usize, CellState> {
        let geometry = layers.geometry();
        let margin = self.config.free_space_margin;
        let sensor = pose.position();

        let mut writes = HashMap::with_capacity(scan.len() * 8);

        for (i, &range) in scan.ranges.iter().enumerate() {
            let angle = scan.beam_angle(i) + pose.theta;
            if !angle.is_finite() {
                warn!("[Integrate] beam {} skipped: angle is not finite", i);
                result.beams_skipped += 1;
                continue;
            }
            result.beams += 1;

            let hit = scan.is_valid_range(range);
            let measured = if hit { range } else { scan.range_max };
            let free_distance = measured - margin;

            for coord in traverse_polar(geometry, sensor, free_distance, angle) {
                match geometry.coord_to_index(coord) {
                    Some(index) => {
                        writes.insert(index, CellState::Free);
                    }
                    None => result.points_out_of_bounds += 1,
                }
            }

            if hit {
                let endpoint = sensor.project(range, angle);
                match geometry.to_cell(endpoint) {
                    Ok(coord) => {
                        trace!("[Integrate] beam {} hit at {:?}", i, coord);
                        if let Some(index) = geometry.coord_to_index(coord) {
                            writes.insert(index, CellState::Occupied);
                        }
                    }
                    Err(GridError::OutOfBounds { .. }) => result.points_out_of_bounds += 1,
                    Err(e) => {
                        warn!("[Integrate] beam {} endpoint skipped: {}", i, e);
                    }
                }
            }
        }

        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GridCoord, WorldPoint};
    use crate::grid::MapInfo;

    fn layers() -> MapLayers {
        let info = MapInfo {
            width: 10,
            height: 10,
            resolution: 1.0,
            origin: WorldPoint::ZERO,
        };
        MapLayers::from_map_info(&info, 1)
    }

    fn single_beam(range: f32) -> LaserScan {
        LaserScan::new(0.0, 0.0, 0.0, 0.1, 9.0, vec![range])
    }

    #[test]
    fn test_single_hit() {
        let mut layers = layers();
        let result = ScanIntegrator::default().integrate(
            &mut layers,
            &single_beam(3.0),
            Pose2D::new(5.0, 5.0, 0.0),
        );

        assert!(result.changed);
        assert_eq!(result.cells_free, 3);
        assert_eq!(result.cells_occupied, 1);
        assert_eq!(layers.grid.get(GridCoord::new(8, 5)), Ok(CellState::Occupied));
        assert_eq!(layers.delta.changed_count(), 4);
    }

    #[test]
    fn test_second_application_is_noop() {
        let mut layers = layers();
        let integrator = ScanIntegrator::default();
        let scan = single_beam(3.0);
        let pose = Pose2D::new(5.0, 5.0, 0.0);

        assert!(integrator.integrate(&mut layers, &scan, pose).changed);
        layers.delta.clear();

        let again = integrator.integrate(&mut layers, &scan, pose);
        assert!(!again.changed);
        assert_eq!(again.cells_changed(), 0);
        assert!(layers.delta.is_empty());
    }

    #[test]
    fn test_short_reading_clamps_ray() {
        let mut layers = layers();
        // Reading just above range_min: free ray length is negative
        let result = ScanIntegrator::default().integrate(
            &mut layers,
            &single_beam(0.15),
            Pose2D::new(5.5, 5.5, 0.0),
        );

        // Sensor cell and endpoint coincide; the endpoint wins
        assert_eq!(result.cells_occupied, 1);
        assert_eq!(result.cells_free, 0);
        assert_eq!(layers.grid.get(GridCoord::new(5, 5)), Ok(CellState::Occupied));
    }

    #[test]
    fn test_hit_outside_grid_counts_out_of_bounds() {
        let mut layers = layers();
        let scan = LaserScan::new(0.0, 0.0, 0.0, 0.1, 20.0, vec![8.0]);
        let result =
            ScanIntegrator::default().integrate(&mut layers, &scan, Pose2D::new(5.0, 5.0, 0.0));

        assert_eq!(result.cells_occupied, 0);
        assert!(result.points_out_of_bounds > 0);
        assert_eq!(result.cells_free, 5);
    }

    #[test]
    fn test_non_finite_pose_skips_scan() {
        let mut layers = layers();
        let result = ScanIntegrator::default().integrate(
            &mut layers,
            &single_beam(3.0),
            Pose2D {
                x: f32::NAN,
                y: 0.0,
                theta: 0.0,
            },
        );
        assert!(!result.changed);
        assert_eq!(result.beams_skipped, 1);
        assert_eq!(layers.grid.count_by_state().unknown, 100);
    }

    #[test]
    fn test_sensor_far_outside_grid() {
        let mut layers = layers();
        let integrator = ScanIntegrator::default();
        // Miss with a huge range_max from a sensor billions of meters away
        let scan = LaserScan::new(0.0, 0.0, 0.0, 0.1, 1.0e10, vec![0.0]);

        let result = integrator.integrate(&mut layers, &scan, Pose2D::new(-3.0e9, 5.0, 0.0));
        assert_eq!(result.beams, 1);
        assert_eq!(result.cells_free, 10);
        assert_eq!(result.cells_occupied, 0);
        for x in 0..10 {
            assert_eq!(layers.grid.get(GridCoord::new(x, 5)), Ok(CellState::Free));
        }
        assert_eq!(layers.grid.count_by_state().unknown, 90);

        // Pointing away from the grid touches nothing
        let mut untouched = self::layers();
        let away = integrator.integrate(
            &mut untouched,
            &scan,
            Pose2D::new(-3.0e9, 5.0, std::f32::consts::PI),
        );
        assert!(!away.changed);
        assert!(untouched.delta.is_empty());
    }

}
