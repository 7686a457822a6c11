//! Test utilities for Bhumi grid scenarios.
//!
//! Helpers for building grids, single-beam scans and simulated room sweeps.

#![allow(dead_code)]

use std::f32::consts::PI;

use bhumi_grid::{CellState, GridCoord, LaserScan, MapInfo, MapLayers, WorldPoint};

/// Square map of `size` native cells at `resolution`, origin at zero.
pub fn square_map(size: usize, resolution: f32) -> MapInfo {
    MapInfo {
        width: size,
        height: size,
        resolution,
        origin: WorldPoint::ZERO,
    }
}

/// 10x10 grid of 1m cells, all Unknown.
pub fn ten_by_ten() -> MapLayers {
    MapLayers::from_map_info(&square_map(10, 1.0), 1)
}

/// Scan with one beam at `angle` (sensor frame).
pub fn single_beam(angle: f32, range: f32, range_max: f32) -> LaserScan {
    LaserScan::new(angle, angle, 0.0, 0.1, range_max, vec![range])
}

/// Every cell in the grid that is not Unknown.
pub fn known_cells(layers: &MapLayers) -> Vec<(GridCoord, CellState)> {
    layers
        .grid
        .iter()
        .filter(|(_, state)| state.is_known())
        .collect()
}

/// Simulated 360° sweep from inside an axis-aligned rectangular room.
///
/// The room spans `[0, width] × [0, height]` in the sensor's frame,
/// with the sensor at `(robot_x, robot_y)` facing +X.
pub fn room_scan(
    room_width: f32,
    room_height: f32,
    robot_x: f32,
    robot_y: f32,
    num_points: usize,
) -> LaserScan {
    let angle_increment = 2.0 * PI / num_points as f32;
    let range_max = (room_width * room_width + room_height * room_height).sqrt() + 1.0;

    let ranges = (0..num_points)
        .map(|i| {
            let angle = i as f32 * angle_increment - PI;
            let (sin_a, cos_a) = angle.sin_cos();
            let mut range = range_max;

            // Distance to each wall along the beam, keeping the nearest hit
            let walls = [
                (cos_a > 0.0, (room_width - robot_x) / cos_a),
                (cos_a < 0.0, -robot_x / cos_a),
                (sin_a > 0.0, (room_height - robot_y) / sin_a),
                (sin_a < 0.0, -robot_y / sin_a),
            ];
            for (facing, t) in walls {
                if facing && t > 0.0 && t < range {
                    range = t;
                }
            }
            range
        })
        .collect();

    LaserScan::new(
        -PI,
        -PI + (num_points - 1) as f32 * angle_increment,
        angle_increment,
        0.15,
        range_max,
        ranges,
    )
}
