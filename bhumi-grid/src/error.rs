//! Error types for grid access and geometry.

/// Result type alias
pub type Result<T> = std::result::Result<T, GridError>;

/// Bhumi grid error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    /// Cell index outside the grid
    #[error("Cell ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds {
        /// Column index
        x: i32,
        /// Row index
        y: i32,
        /// Grid width (cells)
        width: usize,
        /// Grid height (cells)
        height: usize,
    },

    /// Malformed pose or scan geometry
    #[error("Transform failure: {0}")]
    TransformFailure(String),
}
