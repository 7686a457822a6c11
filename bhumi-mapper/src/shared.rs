//! Shared state for the multi-threaded mapper.
//!
//! Provides thread-safe shared state between:
//! - Pose producer (transport or replay thread writing the latest pose)
//! - Mapping thread (stability gate, scan integration)
//! - Publisher thread (periodic map updates)

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use bhumi_grid::{GateStats, MapLayers, Pose2D};
use parking_lot::{Mutex, RwLock};
use tracing::warn;

/// A pose together with the time it was measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StampedPose {
    /// Seconds on the producer's clock
    pub stamp: f64,
    /// Planar pose in the map frame
    pub pose: Pose2D,
}

/// Latest known pose. Single writer, many readers, replace on write.
#[derive(Debug, Default)]
pub struct LatestPose {
    inner: RwLock<Option<StampedPose>>,
}

impl LatestPose {
    /// Create an empty slot; no pose has arrived yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored pose.
    pub fn store(&self, stamped: StampedPose) {
        *self.inner.write() = Some(stamped);
    }

    /// Most recent pose, if any has arrived.
    pub fn pose(&self) -> Option<Pose2D> {
        self.inner.read().map(|s| s.pose)
    }

    /// Most recent pose with its stamp.
    pub fn stamped(&self) -> Option<StampedPose> {
        *self.inner.read()
    }
}

/// Shared state accessible by all threads.
#[derive(Debug, Default)]
pub struct SharedState {
    /// Written by the pose producer, read by the mapping thread
    pub latest_pose: LatestPose,
    shutdown: AtomicBool,
    scans_received: AtomicU64,
    scans_accepted: AtomicU64,
    scans_rejected: AtomicU64,
    scans_superseded: AtomicU64,
    scans_changed: AtomicU64,
    poses_dropped: AtomicU64,
}

/// Snapshot of the runtime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Scans taken off the scan channel
    pub scans_received: u64,
    /// Scans that passed the stability gate
    pub scans_accepted: u64,
    /// Scans rejected for motion or a missing pose
    pub scans_rejected: u64,
    /// Pending scans replaced by a newer one
    pub scans_superseded: u64,
    /// Accepted scans whose integration changed at least one cell
    pub scans_changed: u64,
    /// Pose messages dropped for a degenerate orientation
    pub poses_dropped: u64,
}

impl SharedState {
    /// Create state with no pose and zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a pose message and make it the latest pose.
    ///
    /// Messages with a degenerate orientation are dropped with a warning and
    /// counted; the previous pose stays in place. Returns true if the
    /// message became the latest pose.
    pub fn handle_pose(&self, msg: &messages::PoseMsg) -> bool {
        match msg.to_pose() {
            Ok(pose) => {
                self.latest_pose.store(StampedPose {
                    stamp: msg.stamp,
                    pose,
                });
                true
            }
            Err(e) => {
                self.poses_dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Dropping pose at t={:.3}: {}", msg.stamp, e);
                false
            }
        }
    }

    /// Signal shutdown.
    pub fn signal_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Check if shutdown is signaled.
    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Count a scan taken off the scan channel.
    pub fn record_received(&self) {
        self.scans_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Mirror the mapping thread's gate counters.
    pub fn record_gate(&self, stats: &GateStats) {
        self.scans_accepted.store(stats.accepted, Ordering::Relaxed);
        self.scans_rejected.store(stats.rejected, Ordering::Relaxed);
        self.scans_superseded
            .store(stats.superseded, Ordering::Relaxed);
    }

    /// Count an integrated scan that changed at least one cell.
    pub fn record_changed(&self) {
        self.scans_changed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters at once.
    pub fn counters(&self) -> Counters {
        Counters {
            scans_received: self.scans_received.load(Ordering::Relaxed),
            scans_accepted: self.scans_accepted.load(Ordering::Relaxed),
            scans_rejected: self.scans_rejected.load(Ordering::Relaxed),
            scans_superseded: self.scans_superseded.load(Ordering::Relaxed),
            scans_changed: self.scans_changed.load(Ordering::Relaxed),
            poses_dropped: self.poses_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Thread-safe map storage. One lock guards the grid and its delta.
pub type SharedMap = Arc<Mutex<MapLayers>>;

/// Message types for inter-thread communication.
pub mod messages {
    use bhumi_grid::{GridError, Pose2D, Quaternion, WorldPoint};
    use serde::Deserialize;

    /// Pose as delivered by the pose stream.
    #[derive(Clone, Debug, PartialEq, Deserialize)]
    pub struct PoseMsg {
        /// Seconds on the producer's clock
        #[serde(alias = "t")]
        pub stamp: f64,
        /// Position in the map frame (meters)
        pub x: f32,
        /// Position in the map frame (meters)
        pub y: f32,
        /// Orientation; only the yaw is used. Identity when omitted.
        #[serde(default)]
        pub orientation: Quaternion,
    }

    impl PoseMsg {
        /// Planar pose from the message position and yaw.
        pub fn to_pose(&self) -> std::result::Result<Pose2D, GridError> {
            Pose2D::from_quaternion(WorldPoint::new(self.x, self.y), &self.orientation)
        }
    }
}
