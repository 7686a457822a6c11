//! Robot pose and orientation handling.
//!
//! Poses arrive from the odometry stream with a quaternion orientation. Only
//! the yaw component matters for a planar map, so [`Quaternion::yaw`]
//! reduces it to a heading which [`Pose2D`] keeps in radians on `(-π, π]`.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::point::WorldPoint;
use crate::error::GridError;

/// Smallest quaternion norm accepted as a valid orientation.
const MIN_QUATERNION_NORM: f32 = 1e-6;

/// Unit quaternion orientation as delivered by the pose stream.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    /// X component.
    #[serde(default)]
    pub x: f32,
    /// Y component.
    #[serde(default)]
    pub y: f32,
    /// Z component.
    #[serde(default)]
    pub z: f32,
    /// W (scalar) component.
    #[serde(default = "identity_w")]
    pub w: f32,
}

fn identity_w() -> f32 {
    1.0
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// No rotation.
    pub const IDENTITY: Quaternion = Quaternion {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Create a quaternion from raw components (not normalized).
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Quaternion for a pure rotation of `yaw` radians about +Z.
    pub fn from_yaw(yaw: f32) -> Self {
        let (s, c) = (yaw * 0.5).sin_cos();
        Self::new(0.0, 0.0, s, c)
    }

    /// Euclidean norm of the four components.
    #[inline]
    pub fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    /// Yaw angle (rotation about +Z) in radians on `(-π, π]`.
    ///
    /// Fails with [`GridError::TransformFailure`] for a zero-length or
    /// non-finite quaternion, which has no defined orientation.
    pub fn yaw(&self) -> Result<f32, GridError> {
        let norm = self.norm();
        if !norm.is_finite() || norm < MIN_QUATERNION_NORM {
            return Err(GridError::TransformFailure(format!(
                "orientation quaternion has invalid norm {norm}"
            )));
        }

        let (x, y, z, w) = (self.x / norm, self.y / norm, self.z / norm, self.w / norm);
        let siny_cosp = 2.0 * (w * z + x * y);
        let cosy_cosp = 1.0 - 2.0 * (y * y + z * z);
        Ok(normalize_angle(siny_cosp.atan2(cosy_cosp)))
    }
}

/// Planar robot pose: position in meters, heading in radians.
///
/// Deserialized headings are normalized the same way as [`Pose2D::new`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPose2D")]
pub struct Pose2D {
    /// X position (meters).
    pub x: f32,
    /// Y position (meters).
    pub y: f32,
    /// Heading (radians, CCW from +X, on `(-π, π]`).
    pub theta: f32,
}

/// Pose fields as written in a file, before heading normalization.
#[derive(Deserialize)]
struct RawPose2D {
    x: f32,
    y: f32,
    theta: f32,
}

impl From<RawPose2D> for Pose2D {
    fn from(raw: RawPose2D) -> Self {
        Self::new(raw.x, raw.y, raw.theta)
    }
}

impl Pose2D {
    /// Create a pose; the heading is normalized to `(-π, π]`.
    pub fn new(x: f32, y: f32, theta: f32) -> Self {
        Self {
            x,
            y,
            theta: normalize_angle(theta),
        }
    }

    /// Create a pose with the heading given in degrees.
    pub fn from_degrees(x: f32, y: f32, heading_degrees: f32) -> Self {
        Self::new(x, y, heading_degrees.to_radians())
    }

    /// Create a pose from a position and a quaternion orientation.
    pub fn from_quaternion(position: WorldPoint, orientation: &Quaternion) -> Result<Self, GridError> {
        if !position.is_finite() {
            return Err(GridError::TransformFailure(format!(
                "pose position is not finite: ({}, {})",
                position.x, position.y
            )));
        }
        Ok(Self::new(position.x, position.y, orientation.yaw()?))
    }

    /// The pose at the frame origin facing +X.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Position as a world point.
    #[inline]
    pub fn position(&self) -> WorldPoint {
        WorldPoint::new(self.x, self.y)
    }

    /// Signed heading in degrees on `(-180, 180]`.
    #[inline]
    pub fn heading_degrees(&self) -> f32 {
        self.theta.to_degrees()
    }

    /// All components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }
}

/// Normalize an angle in radians to `(-π, π]`.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

/// Normalize an angle in degrees to `(-180, 180]`.
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}
