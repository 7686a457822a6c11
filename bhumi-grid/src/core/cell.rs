//! Tri-state occupancy cell.

use serde::{Deserialize, Serialize};

/// Occupancy state of a single grid cell.
///
/// Cells start [`Unknown`](CellState::Unknown) and are overwritten directly
/// by each accepted observation; there is no accumulated evidence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    /// A beam passed through this cell.
    Free = 0,
    /// A beam terminated in this cell.
    Occupied = 1,
    /// Never observed.
    #[default]
    Unknown = 2,
}

impl CellState {
    /// Convert from the raw storage value; unrecognized values are Unknown.
    #[inline]
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => CellState::Free,
            1 => CellState::Occupied,
            _ => CellState::Unknown,
        }
    }

    /// True for Free or Occupied.
    #[inline]
    pub fn is_known(self) -> bool {
        self != CellState::Unknown
    }

    /// Value in the ROS `nav_msgs/OccupancyGrid` convention.
    #[inline]
    pub fn to_ros_occupancy(self) -> i8 {
        match self {
            CellState::Free => 0,
            CellState::Occupied => 100,
            CellState::Unknown => -1,
        }
    }

    /// Inverse of [`to_ros_occupancy`](Self::to_ros_occupancy).
    #[inline]
    pub fn from_ros_occupancy(value: i8) -> Self {
        match value {
            0 => CellState::Free,
            100 => CellState::Occupied,
            _ => CellState::Unknown,
        }
    }

    /// Grey level used by map_server PGM images.
    #[inline]
    pub fn to_pgm(self) -> u8 {
        match self {
            CellState::Free => 254,
            CellState::Occupied => 0,
            CellState::Unknown => 205,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8() {
        for state in [CellState::Free, CellState::Occupied, CellState::Unknown] {
            assert_eq!(CellState::from_u8(state as u8), state);
        }
        assert_eq!(CellState::from_u8(42), CellState::Unknown);
    }

    #[test]
    fn test_external_encodings() {
        assert_eq!(CellState::default(), CellState::Unknown);
        assert_eq!(CellState::Occupied.to_ros_occupancy(), 100);
        assert_eq!(CellState::Unknown.to_ros_occupancy(), -1);
        assert_eq!(CellState::Free.to_pgm(), 254);
        assert!(!CellState::Unknown.is_known());
    }
}
