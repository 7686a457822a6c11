//! Threaded runtime tests: gate, integration and publication across threads.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bhumi_grid::{
    CellState, GridCoord, LaserScan, MapInfo, MapLayers, MapSnapshot, MapUpdate, MapperConfig,
    Quaternion, WorldPoint,
};
use bhumi_mapper::shared::messages::PoseMsg;
use bhumi_mapper::{MapSink, NodeConfig, Result, Scenario, SharedState, spawn_replay, spawn_threads};
use crossbeam_channel::{Sender, bounded};
use parking_lot::Mutex;

/// Sink that keeps everything it receives.
#[derive(Default)]
struct RecordingSink {
    updates: Vec<MapUpdate>,
    finished: Option<MapSnapshot>,
}

impl MapSink for RecordingSink {
    fn publish(&mut self, update: &MapUpdate) -> Result<()> {
        self.updates.push(update.clone());
        Ok(())
    }

    fn finish(&mut self, snapshot: &MapSnapshot) -> Result<()> {
        self.finished = Some(snapshot.clone());
        Ok(())
    }
}

impl RecordingSink {
    /// Union of all published changes, later updates overriding earlier ones.
    fn published_cells(&self) -> Vec<(GridCoord, CellState)> {
        let mut cells: Vec<(GridCoord, CellState)> = Vec::new();
        for update in &self.updates {
            for &(coord, state) in &update.changed {
                cells.retain(|(c, _)| *c != coord);
                cells.push((coord, state));
            }
        }
        cells.sort_by_key(|(c, _)| (c.y, c.x));
        cells
    }
}

fn ten_by_ten() -> MapInfo {
    MapInfo {
        width: 10,
        height: 10,
        resolution: 1.0,
        origin: WorldPoint::ZERO,
    }
}

fn config(wait_seconds: f32) -> MapperConfig {
    let mut config = MapperConfig::default();
    config.grid.scale = 1;
    config.stability.wait_seconds = wait_seconds;
    config
}

fn single_beam(range: f32) -> LaserScan {
    LaserScan::new(0.0, 0.0, 0.0, 0.1, 9.0, vec![range])
}

fn pose(stamp: f64, x: f32, y: f32) -> PoseMsg {
    PoseMsg {
        stamp,
        x,
        y,
        orientation: Quaternion::IDENTITY,
    }
}

struct Node {
    state: Arc<SharedState>,
    map: Arc<Mutex<MapLayers>>,
    scan_tx: Sender<LaserScan>,
    handles: bhumi_mapper::ThreadHandles<RecordingSink>,
}

fn start(config: &MapperConfig) -> Node {
    let state = Arc::new(SharedState::new());
    let map = Arc::new(Mutex::new(MapLayers::new(
        config.grid.to_geometry(&ten_by_ten()),
    )));
    let (scan_tx, scan_rx) = bounded(16);
    let handles = spawn_threads(
        config,
        Duration::from_millis(20),
        Arc::clone(&state),
        Arc::clone(&map),
        scan_rx,
        RecordingSink::default(),
    )
    .unwrap();

    Node {
        state,
        map,
        scan_tx,
        handles,
    }
}

/// Close the scan stream, let the mapping thread drain, then stop publishing.
fn stop(node: Node) -> (Arc<SharedState>, RecordingSink) {
    drop(node.scan_tx);
    node.handles.mapping.join().unwrap();
    node.state.signal_shutdown();
    let sink = node.handles.publisher.join().unwrap();
    (node.state, sink)
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    let give_up = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < give_up, "timed out waiting for condition");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_still_pose_is_integrated_and_published() {
    let node = start(&config(0.05));
    assert!(node.state.handle_pose(&pose(0.0, 5.0, 5.0)));
    node.scan_tx.send(single_beam(3.0)).unwrap();

    let map = Arc::clone(&node.map);
    let (state, sink) = stop(node);

    let counters = state.counters();
    assert_eq!(counters.scans_received, 1);
    assert_eq!(counters.scans_accepted, 1);
    assert_eq!(counters.scans_changed, 1);

    let expected = vec![
        (GridCoord::new(5, 5), CellState::Free),
        (GridCoord::new(6, 5), CellState::Free),
        (GridCoord::new(7, 5), CellState::Free),
        (GridCoord::new(8, 5), CellState::Occupied),
    ];
    assert_eq!(sink.published_cells(), expected);
    assert!(sink.updates.iter().any(|u| u.grid_changed));

    // Sequences increase by one per cycle
    assert!(
        sink.updates
            .windows(2)
            .all(|w| w[1].sequence == w[0].sequence + 1)
    );

    let snapshot = sink.finished.expect("final snapshot");
    assert_eq!(snapshot.state(GridCoord::new(8, 5)), Some(CellState::Occupied));
    assert_eq!(snapshot.state(GridCoord::new(0, 0)), Some(CellState::Unknown));

    // Everything was published, so nothing is left in the delta grid
    assert!(map.lock().delta.is_empty());
}

#[test]
fn test_pose_moving_during_wait_is_rejected() {
    let node = start(&config(0.5));
    assert!(node.state.handle_pose(&pose(0.0, 5.0, 5.0)));
    node.scan_tx.send(single_beam(3.0)).unwrap();

    // Scan is in its sampling window once it has been counted
    let state = Arc::clone(&node.state);
    wait_for(|| state.counters().scans_received == 1);
    assert!(node.state.handle_pose(&pose(0.1, 5.002, 5.0)));

    let (state, sink) = stop(node);

    let counters = state.counters();
    assert_eq!(counters.scans_accepted, 0);
    assert_eq!(counters.scans_rejected, 1);
    assert!(sink.updates.iter().all(|u| !u.grid_changed));

    let snapshot = sink.finished.expect("final snapshot");
    assert!(snapshot.data.iter().all(|&v| v == -1));
}

#[test]
fn test_scan_without_pose_is_rejected() {
    let node = start(&config(0.05));
    node.scan_tx.send(single_beam(3.0)).unwrap();

    let (state, sink) = stop(node);

    assert_eq!(state.counters().scans_rejected, 1);
    assert_eq!(state.counters().scans_accepted, 0);
    assert!(sink.published_cells().is_empty());
}

#[test]
fn test_replayed_scenario_builds_map() {
    let scenario = Scenario::from_yaml(
        r#"
name: replay-test
map: { width: 10, height: 10, resolution: 1.0, origin: { x: 0.0, y: 0.0 } }
poses:
  - { t: 0.0, x: 5.0, y: 5.0, orientation: { z: 0.0, w: 1.0 } }
scans:
  - t: 0.01
    scan:
      angle_min: 0.0
      angle_max: 0.0
      angle_increment: 0.0
      range_min: 0.1
      range_max: 9.0
      ranges: [3.0]
"#,
    )
    .unwrap();

    let node = start(&config(0.05));
    let replay = spawn_replay(&scenario, 1.0, Arc::clone(&node.state), node.scan_tx.clone()).unwrap();
    replay.join().unwrap();

    let (state, sink) = stop(node);
    assert_eq!(state.counters().scans_accepted, 1);

    let snapshot = sink.finished.expect("final snapshot");
    assert_eq!(snapshot.state(GridCoord::new(5, 5)), Some(CellState::Free));
    assert_eq!(snapshot.state(GridCoord::new(8, 5)), Some(CellState::Occupied));
}

#[test]
fn test_sample_files_parse() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");

    let scenario = Scenario::load(&root.join("scenarios/demo.yaml")).unwrap();
    assert_eq!(scenario.map.width, 100);
    assert!(!scenario.scans.is_empty());
    assert!(scenario.scans.iter().all(|s| s.scan.validate().is_ok()));

    let mapper = MapperConfig::load(&root.join("configs/mapper.yaml")).unwrap();
    assert_eq!(mapper, MapperConfig::default());

    let text = std::fs::read_to_string(root.join("bhumi.toml")).unwrap();
    let node: NodeConfig = toml::from_str(&text).unwrap();
    assert_eq!(node.publish.period_ms, 1000);
    assert!(node.mapper_file.is_some());
}
