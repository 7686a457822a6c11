//! Range sensor input.
//!
//! ## Angular Convention
//!
//! ```text
//!          0° (+X, Forward)
//!           ↑
//!           │
//!  90° (+Y) ├───────→ -90° (-Y)
//!   Left    │          Right
//!           ↓
//!        ±180° (-X, Back)
//! ```
//!
//! Beam angles are in radians, counter-clockwise from the robot's +X axis,
//! and are rotated into the map frame by the pose heading at integration.

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// One sweep of a planar range sensor.
///
/// Reading `i` was taken at `angle_min + i * angle_increment`. A reading is
/// a valid hit only when it is finite and strictly between `range_min` and
/// `range_max`; anything else is treated as a miss out to `range_max`.
///
/// # Example
///
/// ```rust,ignore
/// use bhumi_grid::core::LaserScan;
///
/// let scan = LaserScan::new(0.0, 0.0, 0.0, 0.1, 9.0, vec![3.0]);
/// assert!(scan.is_valid_range(scan.ranges[0]));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    /// Angle of the first reading (radians).
    pub angle_min: f32,
    /// Angle of the last reading (radians).
    pub angle_max: f32,
    /// Angular step between readings (radians).
    pub angle_increment: f32,
    /// Minimum valid range (meters).
    pub range_min: f32,
    /// Maximum valid range (meters).
    pub range_max: f32,
    /// Range readings (meters).
    #[serde(default)]
    pub ranges: Vec<f32>,
}

impl LaserScan {
    /// Create a scan from its header fields and readings.
    pub fn new(
        angle_min: f32,
        angle_max: f32,
        angle_increment: f32,
        range_min: f32,
        range_max: f32,
        ranges: Vec<f32>,
    ) -> Self {
        Self {
            angle_min,
            angle_max,
            angle_increment,
            range_min,
            range_max,
            ranges,
        }
    }

    /// Number of readings.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the scan has no readings.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Check if a reading is a valid hit.
    #[inline]
    pub fn is_valid_range(&self, range: f32) -> bool {
        range.is_finite() && range > self.range_min && range < self.range_max
    }

    /// Sensor-frame angle of reading `index` (radians).
    #[inline]
    pub fn beam_angle(&self, index: usize) -> f32 {
        self.angle_min + index as f32 * self.angle_increment
    }

    /// Number of valid hits in the scan.
    pub fn valid_count(&self) -> usize {
        self.ranges
            .iter()
            .filter(|&&r| self.is_valid_range(r))
            .count()
    }

    /// Check the header fields needed to place beams.
    ///
    /// Individual readings may be anything; only the angles and
    /// `range_max` must be usable because every beam depends on them.
    pub fn validate(&self) -> Result<(), GridError> {
        let header = [
            ("angle_min", self.angle_min),
            ("angle_max", self.angle_max),
            ("angle_increment", self.angle_increment),
            ("range_min", self.range_min),
            ("range_max", self.range_max),
        ];
        for (name, value) in header {
            if !value.is_finite() {
                return Err(GridError::TransformFailure(format!(
                    "scan field {name} is not finite ({value})"
                )));
            }
        }
        if self.range_max < 0.0 {
            return Err(GridError::TransformFailure(format!(
                "scan range_max is negative ({})",
                self.range_max
            )));
        }
        Ok(())
    }
}
