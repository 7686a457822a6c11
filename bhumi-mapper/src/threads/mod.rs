//! Multi-threaded architecture for the Bhumi mapper.
//!
//! Separates concerns into three threads:
//! - Replay thread: pushes recorded poses and scans into the streams
//! - Mapping thread: stability gate and scan integration
//! - Publisher thread: periodic map updates to the sink

mod mapping;
mod publisher;

pub use mapping::MappingThread;
pub use publisher::PublisherThread;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bhumi_grid::{LaserScan, MapperConfig, StabilityGate};
use crossbeam_channel::{Receiver, Sender};

use crate::error::Result;
use crate::replay::{ReplayThread, Scenario};
use crate::shared::{SharedMap, SharedState};
use crate::sink::MapSink;

/// Thread handles for the multi-threaded system.
pub struct ThreadHandles<S> {
    /// Exits once the scan stream ends and the gate is drained
    pub mapping: JoinHandle<()>,
    /// Yields the sink back once the final publish is done
    pub publisher: JoinHandle<S>,
}

/// Spawn the mapping and publisher threads and return handles.
pub fn spawn_threads<S: MapSink + 'static>(
    config: &MapperConfig,
    publish_period: Duration,
    shared_state: Arc<SharedState>,
    shared_map: SharedMap,
    scan_rx: Receiver<LaserScan>,
    sink: S,
) -> Result<ThreadHandles<S>> {
    let gate = StabilityGate::new(config.stability.clone());
    let integrator = config.integrator();

    let mapping_state = Arc::clone(&shared_state);
    let mapping_map = Arc::clone(&shared_map);

    let mapping_handle = thread::Builder::new()
        .name("mapping".into())
        .spawn(move || {
            let mut mapping_thread =
                MappingThread::new(mapping_state, mapping_map, scan_rx, gate, integrator);
            mapping_thread.run();
        })?;

    let publisher_handle = thread::Builder::new()
        .name("publisher".into())
        .spawn(move || PublisherThread::new(shared_state, shared_map, sink, publish_period).run())?;

    Ok(ThreadHandles {
        mapping: mapping_handle,
        publisher: publisher_handle,
    })
}

/// Spawn a thread replaying `scenario` into the pose and scan streams.
pub fn spawn_replay(
    scenario: &Scenario,
    rate: f64,
    shared_state: Arc<SharedState>,
    scan_tx: Sender<LaserScan>,
) -> Result<JoinHandle<()>> {
    let replay = ReplayThread::new(scenario, rate, shared_state, scan_tx);
    let handle = thread::Builder::new()
        .name("replay".into())
        .spawn(move || replay.run())?;
    Ok(handle)
}
