//! Mapping thread: stability gating and map updates.
//!
//! This thread receives scans from the scan channel and:
//! - Runs each scan through the pose stability gate
//! - Integrates accepted scans into the shared map under its lock
//! - Mirrors gate counters into the shared state

use std::sync::Arc;
use std::time::{Duration, Instant};

use bhumi_grid::{GateOutcome, LaserScan, ScanIntegrator, StabilityGate, SubmitOutcome};
use crossbeam_channel::{Receiver, after, at, never, select};
use tracing::{debug, info, trace};

use crate::shared::{SharedMap, SharedState};

/// How long to block when no sampling window is open.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Mapping thread state and logic.
pub struct MappingThread {
    shared_state: Arc<SharedState>,
    shared_map: SharedMap,
    scan_rx: Receiver<LaserScan>,
    gate: StabilityGate,
    integrator: ScanIntegrator,
}

impl MappingThread {
    /// Create a new mapping thread.
    pub fn new(
        shared_state: Arc<SharedState>,
        shared_map: SharedMap,
        scan_rx: Receiver<LaserScan>,
        gate: StabilityGate,
        integrator: ScanIntegrator,
    ) -> Self {
        Self {
            shared_state,
            shared_map,
            scan_rx,
            gate,
            integrator,
        }
    }

    /// Run the mapping thread main loop.
    ///
    /// Returns when shutdown is signaled, or once the scan stream has ended
    /// and the gate has nothing left to decide.
    pub fn run(&mut self) {
        info!("Mapping thread started");
        let mut connected = true;

        loop {
            if self.shared_state.should_shutdown() {
                info!("Mapping thread shutting down");
                break;
            }
            if !connected && self.gate.is_idle() {
                info!("Scan stream ended, mapping thread exiting");
                break;
            }

            let timeout = match self.gate.deadline() {
                Some(deadline) => at(deadline),
                None => after(IDLE_POLL),
            };
            let scans = if connected {
                self.scan_rx.clone()
            } else {
                never()
            };

            select! {
                recv(scans) -> msg => match msg {
                    Ok(scan) => self.on_scan(scan),
                    Err(_) => {
                        debug!("Scan channel disconnected, draining gate");
                        connected = false;
                    }
                },
                recv(timeout) -> _ => {}
            }

            self.poll_gate();
        }

        let stats = self.gate.stats();
        self.shared_state.record_gate(&stats);
        info!(
            "Mapping stats: {} accepted, {} rejected, {} superseded ({:.0}% acceptance)",
            stats.accepted,
            stats.rejected,
            stats.superseded,
            stats.acceptance_rate() * 100.0
        );
    }

    /// Hand a newly received scan to the gate.
    fn on_scan(&mut self, scan: LaserScan) {
        let pose = self.shared_state.latest_pose.pose();

        match self.gate.submit(scan, Instant::now(), pose) {
            SubmitOutcome::Sampling { .. } => trace!("Scan sampling started"),
            SubmitOutcome::Queued => trace!("Scan queued behind in-flight scan"),
            SubmitOutcome::Superseded => trace!("Pending scan superseded"),
            SubmitOutcome::Rejected(reason) => debug!("Scan rejected on arrival: {:?}", reason),
        }
        self.shared_state.record_gate(&self.gate.stats());
        self.shared_state.record_received();
    }

    /// Close the sampling window if it is due and integrate an accepted scan.
    fn poll_gate(&mut self) {
        let pose = self.shared_state.latest_pose.pose();

        match self.gate.poll(Instant::now(), pose) {
            Some(GateOutcome::Accepted { scan, pose }) => {
                let result = {
                    let mut layers = self.shared_map.lock();
                    self.integrator.integrate(&mut layers, &scan, pose)
                };
                if result.changed {
                    self.shared_state.record_changed();
                }
                debug!(
                    "Scan integrated: {} cells changed ({} free, {} occupied)",
                    result.cells_changed(),
                    result.cells_free,
                    result.cells_occupied
                );
                self.gate
                    .complete(Instant::now(), self.shared_state.latest_pose.pose());
            }
            Some(GateOutcome::Rejected { reason }) => {
                debug!("Scan rejected after stability wait: {:?}", reason);
            }
            None => return,
        }
        self.shared_state.record_gate(&self.gate.stats());
    }
}
