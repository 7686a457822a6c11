//! Stream replay from a recorded scenario.
//!
//! A scenario holds the served map plus timestamped pose and scan streams.
//! The replay thread pushes them into the same places a live transport
//! would: poses into [`SharedState`], scans into the scan channel.
//!
//! ```yaml
//! name: hallway
//! map: { width: 200, height: 200, resolution: 0.05, origin: { x: -5.0, y: -5.0 } }
//! poses:
//!   - { t: 0.0, x: 0.0, y: 0.0, orientation: { z: 0.0, w: 1.0 } }
//! scans:
//!   - t: 0.1
//!     scan: { angle_min: 0.0, angle_max: 0.0, angle_increment: 0.0,
//!             range_min: 0.1, range_max: 8.0, ranges: [2.5] }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bhumi_grid::{LaserScan, MapInfo};
use crossbeam_channel::Sender;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{MapperError, Result};
use crate::shared::SharedState;
use crate::shared::messages::PoseMsg;

/// Longest single sleep between shutdown checks.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Recorded map, pose stream and scan stream.
#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    /// Label used in log output
    #[serde(default)]
    pub name: String,
    /// Geometry of the served map
    pub map: MapInfo,
    /// Pose stream, any order
    #[serde(default)]
    pub poses: Vec<PoseMsg>,
    /// Scan stream, any order
    #[serde(default)]
    pub scans: Vec<TimedScan>,
}

/// A scan with its arrival time in seconds.
#[derive(Clone, Debug, Deserialize)]
pub struct TimedScan {
    /// Seconds from the start of the recording
    pub t: f64,
    /// The recorded scan
    pub scan: LaserScan,
}

/// One replayed stream event.
#[derive(Clone, Debug)]
pub enum ReplayEvent {
    Pose(PoseMsg),
    Scan(LaserScan),
}

impl ReplayEvent {
    fn kind(&self) -> &'static str {
        match self {
            ReplayEvent::Pose(_) => "pose",
            ReplayEvent::Scan(_) => "scan",
        }
    }
}

impl Scenario {
    /// Load a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MapperError::Replay(format!("Failed to read scenario {:?}: {}", path, e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a scenario
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        let bad_time = |t: f64| !t.is_finite() || t < 0.0;
        if let Some(p) = self.poses.iter().find(|p| bad_time(p.stamp)) {
            return Err(MapperError::Replay(format!("invalid pose time {}", p.stamp)));
        }
        if let Some(s) = self.scans.iter().find(|s| bad_time(s.t)) {
            return Err(MapperError::Replay(format!("invalid scan time {}", s.t)));
        }
        Ok(())
    }

    /// All events in time order. Poses come before scans with the same time.
    pub fn events(&self) -> Vec<(f64, ReplayEvent)> {
        let mut events: Vec<(f64, ReplayEvent)> = self
            .poses
            .iter()
            .map(|p| (p.stamp, ReplayEvent::Pose(p.clone())))
            .chain(
                self.scans
                    .iter()
                    .map(|s| (s.t, ReplayEvent::Scan(s.scan.clone()))),
            )
            .collect();
        events.sort_by(|a, b| a.0.total_cmp(&b.0));
        events
    }

    /// Time of the last event in seconds.
    pub fn duration(&self) -> f64 {
        self.events().last().map_or(0.0, |(t, _)| *t)
    }
}

/// Replays a scenario in real time.
pub struct ReplayThread {
    events: Vec<(f64, ReplayEvent)>,
    rate: f64,
    shared_state: Arc<SharedState>,
    scan_tx: Sender<LaserScan>,
}

impl ReplayThread {
    /// `rate` scales playback speed; 2.0 plays twice as fast.
    pub fn new(
        scenario: &Scenario,
        rate: f64,
        shared_state: Arc<SharedState>,
        scan_tx: Sender<LaserScan>,
    ) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate
        } else {
            warn!("Invalid replay rate {}, using 1.0", rate);
            1.0
        };
        Self {
            events: scenario.events(),
            rate,
            shared_state,
            scan_tx,
        }
    }

    /// Run until all events are delivered or shutdown is signaled.
    ///
    /// Dropping the scan sender on return tells the mapping thread that the
    /// stream has ended.
    pub fn run(self) {
        info!("Replay thread started ({} events)", self.events.len());
        let start = Instant::now();

        for (t, event) in self.events {
            let Some(due) = due_at(start, t, self.rate) else {
                warn!("[Replay] event at t={} is beyond the playable range, stopping", t);
                return;
            };
            if !sleep_until(due, &self.shared_state) {
                info!("Replay thread shutting down");
                return;
            }

            debug!("[Replay] t={:.3} {}", t, event.kind());
            match event {
                ReplayEvent::Pose(msg) => {
                    self.shared_state.handle_pose(&msg);
                }
                ReplayEvent::Scan(scan) => {
                    if self.scan_tx.send(scan).is_err() {
                        warn!("Scan channel disconnected, replay thread exiting");
                        return;
                    }
                }
            }
        }

        info!("Replay finished after {:.2}s", start.elapsed().as_secs_f32());
    }
}

/// Wall-clock time for an event `t` seconds into the recording, or `None`
/// if it cannot be represented.
fn due_at(start: Instant, t: f64, rate: f64) -> Option<Instant> {
    let offset = Duration::try_from_secs_f64(t / rate).ok()?;
    start.checked_add(offset)
}

/// Sleep until `due`, waking periodically to check for shutdown.
/// Returns false if shutdown was signaled.
fn sleep_until(due: Instant, shared_state: &SharedState) -> bool {
    loop {
        if shared_state.should_shutdown() {
            return false;
        }
        let now = Instant::now();
        if now >= due {
            return true;
        }
        std::thread::sleep((due - now).min(SLEEP_SLICE));
    }
}
