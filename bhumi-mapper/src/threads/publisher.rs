//! Publisher thread: periodic map updates to the sink.

use std::sync::Arc;
use std::time::Duration;

use bhumi_grid::MapUpdate;
use crossbeam_channel::{select, tick};
use tracing::{error, info};

use crate::shared::{SharedMap, SharedState};
use crate::sink::MapSink;

/// Publisher thread state and logic.
pub struct PublisherThread<S: MapSink> {
    shared_state: Arc<SharedState>,
    shared_map: SharedMap,
    sink: S,
    period: Duration,
    sequence: u64,
}

impl<S: MapSink> PublisherThread<S> {
    /// Create a publisher that hands updates to `sink` every `period`.
    pub fn new(
        shared_state: Arc<SharedState>,
        shared_map: SharedMap,
        sink: S,
        period: Duration,
    ) -> Self {
        Self {
            shared_state,
            shared_map,
            sink,
            period,
            sequence: 0,
        }
    }

    /// Publish once per period until shutdown, then publish the remaining
    /// changes and hand the final grid to the sink.
    ///
    /// Returns the sink so callers can inspect what it received.
    pub fn run(mut self) -> S {
        info!("Publisher thread started ({} ms period)", self.period.as_millis());
        let ticker = tick(self.period);
        let check = tick(self.period.min(Duration::from_millis(50)));

        loop {
            if self.shared_state.should_shutdown() {
                break;
            }
            select! {
                recv(ticker) -> _ => self.publish(),
                recv(check) -> _ => {}
            }
        }

        self.publish();
        let snapshot = self.shared_map.lock().snapshot();
        if let Err(e) = self.sink.finish(&snapshot) {
            error!("Failed to finish map sink: {}", e);
        }
        info!("Publisher thread stopped after {} cycles", self.sequence);
        self.sink
    }

    /// Snapshot changed cells and clear the delta grid under one lock.
    fn take_update(&mut self) -> MapUpdate {
        self.sequence += 1;
        self.shared_map.lock().take_update(self.sequence)
    }

    fn publish(&mut self) {
        let update = self.take_update();
        if let Err(e) = self.sink.publish(&update) {
            error!("Failed to publish update #{}: {}", update.sequence, e);
        }
    }
}
