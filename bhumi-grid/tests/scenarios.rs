//! Scenario tests for scan integration, traversal and stability gating.

mod common;

use std::collections::HashSet;
use std::time::{Duration, Instant};

use bhumi_grid::grid::raycaster::traverse;
use bhumi_grid::{
    CellState, GateOutcome, GridCoord, LaserScan, MapInfo, MapLayers, Pose2D, RejectReason,
    ScanIntegrator, StabilityConfig, StabilityGate, WorldPoint,
};
use common::{known_cells, room_scan, single_beam, ten_by_ten};

#[test]
fn test_single_beam_end_to_end() {
    let mut layers = ten_by_ten();
    let scan = single_beam(0.0, 3.0, 9.0);

    let result = ScanIntegrator::default().integrate(&mut layers, &scan, Pose2D::new(5.0, 5.0, 0.0));
    assert!(result.changed);

    let known: HashSet<_> = known_cells(&layers).into_iter().collect();
    let expected: HashSet<_> = [
        (GridCoord::new(5, 5), CellState::Free),
        (GridCoord::new(6, 5), CellState::Free),
        (GridCoord::new(7, 5), CellState::Free),
        (GridCoord::new(8, 5), CellState::Occupied),
    ]
    .into_iter()
    .collect();
    assert_eq!(known, expected);

    let counts = layers.grid.count_by_state();
    assert_eq!(counts.unknown, 96);

    // Every changed cell is flagged in the delta grid
    let mut changed = layers.delta.changed_coords();
    changed.sort_by_key(|c| (c.y, c.x));
    assert_eq!(
        changed,
        vec![
            GridCoord::new(5, 5),
            GridCoord::new(6, 5),
            GridCoord::new(7, 5),
            GridCoord::new(8, 5)
        ]
    );
}

#[test]
fn test_invalid_reading_clears_to_range_max() {
    let mut layers = ten_by_ten();
    let scan = single_beam(0.0, 10.0, 9.0);

    let result = ScanIntegrator::default().integrate(&mut layers, &scan, Pose2D::new(5.0, 5.0, 0.0));
    assert!(result.changed);
    assert_eq!(result.cells_occupied, 0);
    assert!(result.points_out_of_bounds > 0);

    let known = known_cells(&layers);
    assert_eq!(known.len(), 5);
    for x in 5..10 {
        assert_eq!(layers.grid.get(GridCoord::new(x, 5)), Ok(CellState::Free));
    }
    assert!(known.iter().all(|(_, s)| *s == CellState::Free));
}

#[test]
fn test_nan_reading_is_a_miss() {
    let mut layers = ten_by_ten();
    let scan = single_beam(0.0, f32::NAN, 3.0);

    let result = ScanIntegrator::default().integrate(&mut layers, &scan, Pose2D::new(5.5, 5.5, 0.0));
    assert_eq!(result.beams, 1);
    assert_eq!(result.cells_occupied, 0);
    // Free out to range_max - margin = 2.9m: cells 5, 6, 7, 8
    assert_eq!(result.cells_free, 4);
}

#[test]
fn test_room_scan_is_idempotent() {
    let info = MapInfo {
        width: 120,
        height: 120,
        resolution: 0.05,
        origin: WorldPoint::new(-1.0, -1.0),
    };
    let mut layers = MapLayers::from_map_info(&info, 5);
    let integrator = ScanIntegrator::default();
    let scan = room_scan(4.0, 4.0, 2.0, 2.0, 360);
    let pose = Pose2D::new(2.0, 2.0, 0.0);

    let first = integrator.integrate(&mut layers, &scan, pose);
    assert!(first.changed);
    assert!(first.cells_occupied > 0);
    assert_eq!(first.beams, 360);

    let update = layers.take_update(1);
    assert_eq!(update.changed.len(), first.cells_changed());

    let second = integrator.integrate(&mut layers, &scan, pose);
    assert!(!second.changed);
    assert!(layers.delta.is_empty());
}

#[test]
fn test_room_walls_are_occupied() {
    let info = MapInfo {
        width: 120,
        height: 120,
        resolution: 0.05,
        origin: WorldPoint::new(-1.0, -1.0),
    };
    let mut layers = MapLayers::from_map_info(&info, 5);
    let scan = room_scan(4.0, 4.0, 2.0, 2.0, 360);
    ScanIntegrator::default().integrate(&mut layers, &scan, Pose2D::new(2.0, 2.0, 0.0));

    // Walls at x,y = 0 and 4 fall on cells 4 and 20 (0.25m cells from -1m)
    let near_wall = |v: i32| (3..=4).contains(&v) || (19..=20).contains(&v);
    let occupied: Vec<_> = known_cells(&layers)
        .into_iter()
        .filter(|(_, s)| *s == CellState::Occupied)
        .map(|(c, _)| c)
        .collect();

    assert!(!occupied.is_empty());
    for c in occupied {
        assert!(near_wall(c.x) || near_wall(c.y), "interior hit at {c:?}");
    }

    // Robot cell was seen through
    assert_eq!(layers.grid.get(GridCoord::new(12, 12)), Ok(CellState::Free));
}

#[test]
fn test_later_endpoint_wins_over_earlier_free_ray() {
    let mut layers = ten_by_ten();
    // Beam 0 passes through (4,5); beam 1 ends in it
    let scan = LaserScan::new(0.0, 0.1, 0.1, 0.1, 9.0, vec![6.0, 3.0]);

    ScanIntegrator::default().integrate(&mut layers, &scan, Pose2D::new(1.5, 5.5, 0.0));

    assert_eq!(layers.grid.get(GridCoord::new(4, 5)), Ok(CellState::Occupied));
    assert_eq!(layers.grid.get(GridCoord::new(7, 5)), Ok(CellState::Occupied));
}

#[test]
fn test_later_free_ray_wins_over_earlier_endpoint() {
    let mut layers = ten_by_ten();
    // Beam 0 ends in (4,5); beam 1 passes through it
    let scan = LaserScan::new(0.0, -0.1, -0.1, 0.1, 9.0, vec![3.0, 6.0]);

    ScanIntegrator::default().integrate(&mut layers, &scan, Pose2D::new(1.5, 5.5, 0.0));

    assert_eq!(layers.grid.get(GridCoord::new(4, 5)), Ok(CellState::Free));
}

#[test]
fn test_transform_round_trip() {
    let info = MapInfo {
        width: 300,
        height: 200,
        resolution: 0.05,
        origin: WorldPoint::new(-7.5, -5.0),
    };
    let layers = MapLayers::from_map_info(&info, 5);
    let geometry = layers.geometry();
    let half = geometry.cell_size() / 2.0;

    for i in 0..50 {
        let p = WorldPoint::new(-7.4 + i as f32 * 0.29, -4.9 + i as f32 * 0.19);
        let center = geometry.cell_center(geometry.to_cell(p).unwrap());
        assert!((center.x - p.x).abs() <= half + 1e-4, "x drift at {p:?}");
        assert!((center.y - p.y).abs() <= half + 1e-4, "y drift at {p:?}");
    }
}

#[test]
fn test_traversal_has_no_gaps() {
    let start = GridCoord::new(0, 0);
    for &(x, y) in &[(9, 0), (0, -9), (9, 9), (-9, 4), (3, -8), (-1, -1)] {
        let end = GridCoord::new(x, y);
        let cells = traverse(start, end);

        assert_eq!(cells.first(), Some(&start));
        assert_eq!(cells.last(), Some(&end));
        assert_eq!(cells.len() as i32, x.abs().max(y.abs()) + 1);
        assert!(cells.windows(2).all(|w| w[0].is_adjacent(&w[1])));
    }
}

#[test]
fn test_gate_then_integrate() {
    let mut layers = ten_by_ten();
    let integrator = ScanIntegrator::default();
    let mut gate = StabilityGate::new(StabilityConfig::default());

    let t0 = Instant::now();
    let first = Pose2D::new(5.0, 5.0, 0.0);
    gate.submit(single_beam(0.0, 3.0, 9.0), t0, Some(first));

    // Slight jitter below the thresholds
    let second = Pose2D::new(5.0005, 5.0, 0.0);
    let t1 = t0 + Duration::from_millis(250);
    let Some(GateOutcome::Accepted { scan, pose }) = gate.poll(t1, Some(second)) else {
        panic!("stable pose should be accepted");
    };
    assert_eq!(pose, second);

    let result = integrator.integrate(&mut layers, &scan, pose);
    gate.complete(t1, Some(second));
    assert!(result.changed);
    assert_eq!(layers.grid.get(GridCoord::new(8, 5)), Ok(CellState::Occupied));
    assert!(gate.is_idle());
}

#[test]
fn test_gate_rejects_moving_pose() {
    let mut gate = StabilityGate::new(StabilityConfig::default());
    let t0 = Instant::now();
    gate.submit(single_beam(0.0, 3.0, 9.0), t0, Some(Pose2D::new(5.0, 5.0, 0.0)));

    let outcome = gate.poll(t0 + Duration::from_millis(250), Some(Pose2D::new(5.002, 5.0, 0.0)));
    match outcome {
        Some(GateOutcome::Rejected {
            reason: RejectReason::Moving { dx, .. },
        }) => assert!((dx - 0.002).abs() < 1e-5),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn test_gate_heading_across_pi() {
    let mut gate = StabilityGate::new(StabilityConfig::default());
    let t0 = Instant::now();
    gate.submit(
        single_beam(0.0, 3.0, 9.0),
        t0,
        Some(Pose2D::from_degrees(5.0, 5.0, 179.95)),
    );

    let outcome = gate.poll(
        t0 + Duration::from_millis(250),
        Some(Pose2D::from_degrees(5.0, 5.0, -179.98)),
    );
    assert!(matches!(outcome, Some(GateOutcome::Accepted { .. })));
}
