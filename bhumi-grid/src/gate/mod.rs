//! Pose stability gate.
//!
//! A scan is only trusted if the robot was standing still while it was
//! taken. The gate samples the latest pose when a scan arrives, waits a
//! fixed window, samples again and accepts the scan only if the two samples
//! agree within tolerance. The scan is then projected with the pose read
//! at the **end** of the window.
//!
//! # State Machine
//!
//! ```text
//!                submit (pose known)
//!  AwaitingScan ───────────────────────▶ Sampling { deadline }
//!       ▲                                     │ poll(now >= deadline)
//!       │ rejected / complete,                ├── moved ──▶ Rejected
//!       │ nothing pending                     └── still ──▶ Integrating
//!       └─────────────────────────────────────────────────────┘ complete
//! ```
//!
//! The gate never sleeps. The caller owns the clock, waits until
//! [`StabilityGate::deadline`] and then calls [`StabilityGate::poll`].
//! Scans submitted while the gate is busy go to a single pending slot; a
//! newer scan supersedes an older pending one.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut gate = StabilityGate::new(StabilityConfig::default());
//! gate.submit(scan, Instant::now(), latest_pose());
//!
//! // ... later, once the deadline has passed
//! if let Some(GateOutcome::Accepted { scan, pose }) = gate.poll(Instant::now(), latest_pose()) {
//!     integrator.integrate(&mut layers, &scan, pose);
//!     gate.complete(Instant::now(), latest_pose());
//! }
//! ```

mod config;

pub use config::{RejectReason, StabilityConfig};

use std::time::Instant;

use tracing::{debug, warn};

use crate::core::{LaserScan, Pose2D};

/// Current phase of the gate, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GatePhase {
    /// Idle, waiting for the next scan.
    AwaitingScan,
    /// Holding a scan until its sampling window closes.
    SamplingStability,
    /// An accepted scan is being integrated by the caller.
    Integrating,
}

/// Immediate result of handing a scan to the gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Sampling started; poll again at `deadline`.
    Sampling {
        /// When the second pose sample is due.
        deadline: Instant,
    },
    /// The gate is busy; the scan waits in the pending slot.
    Queued,
    /// The gate is busy; the scan replaced an older pending scan.
    Superseded,
    /// The scan was dropped immediately.
    Rejected(RejectReason),
}

/// Decision for a scan whose sampling window has closed.
#[derive(Clone, Debug, PartialEq)]
pub enum GateOutcome {
    /// Integrate `scan` at `pose`, then call [`StabilityGate::complete`].
    Accepted {
        /// The stable scan.
        scan: LaserScan,
        /// Pose sampled at the end of the window.
        pose: Pose2D,
    },
    /// The scan was dropped.
    Rejected {
        /// Why the scan was dropped.
        reason: RejectReason,
    },
}

/// Gate counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Scans that passed the stability check.
    pub accepted: u64,
    /// Scans dropped for motion or a missing pose.
    pub rejected: u64,
    /// Pending scans replaced before they were sampled.
    pub superseded: u64,
}

impl GateStats {
    /// Total scans that reached a decision.
    #[inline]
    pub fn total(&self) -> u64 {
        self.accepted + self.rejected
    }

    /// Get the acceptance rate (0.0 - 1.0).
    pub fn acceptance_rate(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            1.0
        } else {
            self.accepted as f32 / total as f32
        }
    }
}

#[derive(Debug)]
enum GateState {
    AwaitingScan,
    Sampling {
        scan: LaserScan,
        first: Pose2D,
        deadline: Instant,
    },
    Integrating,
}

/// Explicit state machine for the two-sample stability check.
#[derive(Debug)]
pub struct StabilityGate {
    config: StabilityConfig,
    state: GateState,
    pending: Option<LaserScan>,
    stats: GateStats,
}

impl StabilityGate {
    /// Create an idle gate.
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            config,
            state: GateState::AwaitingScan,
            pending: None,
            stats: GateStats::default(),
        }
    }

    /// Gate configuration.
    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }

    /// Counters since creation.
    pub fn stats(&self) -> GateStats {
        self.stats
    }

    /// Current phase.
    pub fn phase(&self) -> GatePhase {
        match self.state {
            GateState::AwaitingScan => GatePhase::AwaitingScan,
            GateState::Sampling { .. } => GatePhase::SamplingStability,
            GateState::Integrating => GatePhase::Integrating,
        }
    }

    /// When the current sampling window closes, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            GateState::Sampling { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// True if a scan is waiting in the pending slot.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Nothing in flight and nothing pending.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, GateState::AwaitingScan) && self.pending.is_none()
    }

    /// Hand a newly received scan to the gate.
    ///
    /// `pose` is the latest pose at the time of arrival.
    pub fn submit(&mut self, scan: LaserScan, now: Instant, pose: Option<Pose2D>) -> SubmitOutcome {
        match self.state {
            GateState::AwaitingScan => match self.start_sampling(scan, now, pose) {
                Ok(deadline) => SubmitOutcome::Sampling { deadline },
                Err(reason) => SubmitOutcome::Rejected(reason),
            },
            GateState::Sampling { .. } | GateState::Integrating => {
                if self.pending.replace(scan).is_some() {
                    self.stats.superseded += 1;
                    debug!("[Gate] pending scan superseded by newer scan");
                    SubmitOutcome::Superseded
                } else {
                    SubmitOutcome::Queued
                }
            }
        }
    }

    /// Close the sampling window if its deadline has passed.
    ///
    /// `pose` is the latest pose now. Returns `None` while the window is
    /// still open or when no scan is being sampled. After a rejection the
    /// pending scan, if any, starts sampling immediately.
    pub fn poll(&mut self, now: Instant, pose: Option<Pose2D>) -> Option<GateOutcome> {
        let due = matches!(self.state, GateState::Sampling { deadline, .. } if now >= deadline);
        if !due {
            return None;
        }

        let GateState::Sampling { scan, first, .. } =
            std::mem::replace(&mut self.state, GateState::AwaitingScan)
        else {
            return None;
        };

        let verdict = match pose {
            Some(second) => self.config.check(&first, &second).map(|()| second),
            None => Err(RejectReason::NoPose),
        };

        match verdict {
            Ok(second) => {
                self.stats.accepted += 1;
                self.state = GateState::Integrating;
                debug!(
                    "[Gate] scan accepted at ({:.3}, {:.3}, {:.2}°)",
                    second.x,
                    second.y,
                    second.heading_degrees()
                );
                Some(GateOutcome::Accepted { scan, pose: second })
            }
            Err(reason) => {
                self.stats.rejected += 1;
                debug!("[Gate] scan rejected: {:?}", reason);
                self.start_pending(now, pose);
                Some(GateOutcome::Rejected { reason })
            }
        }
    }

    /// Signal that integration of the accepted scan has finished.
    ///
    /// Starts sampling the pending scan if there is one.
    pub fn complete(&mut self, now: Instant, pose: Option<Pose2D>) {
        if matches!(self.state, GateState::Integrating) {
            self.state = GateState::AwaitingScan;
            self.start_pending(now, pose);
        }
    }

    fn start_pending(&mut self, now: Instant, pose: Option<Pose2D>) {
        if let Some(scan) = self.pending.take() {
            // A rejection here is already counted and logged.
            let _ = self.start_sampling(scan, now, pose);
        }
    }

    fn start_sampling(
        &mut self,
        scan: LaserScan,
        now: Instant,
        pose: Option<Pose2D>,
    ) -> Result<Instant, RejectReason> {
        let Some(first) = pose else {
            self.stats.rejected += 1;
            warn!("[Gate] scan dropped: no pose received yet");
            return Err(RejectReason::NoPose);
        };

        let deadline = now + self.config.wait();
        self.state = GateState::Sampling {
            scan,
            first,
            deadline,
        };
        Ok(deadline)
    }
}
