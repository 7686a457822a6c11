//! Stability thresholds and the pairwise pose comparison.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Pose2D, normalize_degrees};

/// Why a scan was not integrated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RejectReason {
    /// No pose had been received when the scan arrived or the window closed.
    NoPose,
    /// The pose changed across the sampling window.
    Moving {
        /// X displacement (meters)
        dx: f32,
        /// Y displacement (meters)
        dy: f32,
        /// Heading change (degrees)
        dheading_deg: f32,
    },
}

/// Configuration for the pose stability gate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StabilityConfig {
    /// Time between the two pose samples (seconds).
    ///
    /// Default: 0.2 seconds
    #[serde(default = "default_wait_seconds")]
    pub wait_seconds: f32,

    /// Largest per-axis displacement still considered stationary (meters).
    ///
    /// Default: 0.001 meters (1mm)
    #[serde(default = "default_max_position_delta")]
    pub max_position_delta: f32,

    /// Largest heading change still considered stationary (degrees).
    ///
    /// Default: 0.1 degrees
    #[serde(default = "default_max_heading_delta_degrees")]
    pub max_heading_delta_degrees: f32,

    /// Wrap the heading difference to (-180, 180] before comparing.
    ///
    /// When false, headings either side of ±180° look like a full turn
    /// and the scan is rejected.
    #[serde(default = "default_wrap_heading")]
    pub wrap_heading: bool,
}

fn default_wait_seconds() -> f32 {
    0.2
}
fn default_max_position_delta() -> f32 {
    0.001
}
fn default_max_heading_delta_degrees() -> f32 {
    0.1
}
fn default_wrap_heading() -> bool {
    true
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            wait_seconds: default_wait_seconds(),
            max_position_delta: default_max_position_delta(),
            max_heading_delta_degrees: default_max_heading_delta_degrees(),
            wrap_heading: default_wrap_heading(),
        }
    }
}

impl StabilityConfig {
    /// Sampling window as a duration (negative values collapse to zero).
    pub fn wait(&self) -> Duration {
        Duration::from_secs_f32(self.wait_seconds.max(0.0))
    }

    /// Compare two pose samples.
    ///
    /// Every delta must be strictly below its threshold.
    pub fn check(&self, first: &Pose2D, second: &Pose2D) -> Result<(), RejectReason> {
        let dx = second.x - first.x;
        let dy = second.y - first.y;
        let raw = second.heading_degrees() - first.heading_degrees();
        let dheading_deg = if self.wrap_heading {
            normalize_degrees(raw)
        } else {
            raw
        };

        if dx.abs() < self.max_position_delta
            && dy.abs() < self.max_position_delta
            && dheading_deg.abs() < self.max_heading_delta_degrees
        {
            Ok(())
        } else {
            Err(RejectReason::Moving {
                dx,
                dy,
                dheading_deg,
            })
        }
    }

    /// True if the robot did not move between the two samples.
    #[inline]
    pub fn is_stable(&self, first: &Pose2D, second: &Pose2D) -> bool {
        self.check(first, second).is_ok()
    }
}
