use thiserror::Error;

use crate::interpolation::InterpolationError;

#[derive(Debug, Error)]
pub enum GriddingError {
    /// Interpolation method is not one of `linear`, `nearest`, `cubic`.
    #[error("Invalid method for gridding: {0}, valid options are [\"linear\", \"nearest\", \"cubic\"]")]
    UnsupportedMethod(String),

    #[error("Could not do gridding: {0}")]
    GriddingFailure(String),

    #[error("A zone range is required")]
    MissingZoneRange,

    #[error("Conflicting options: {0}")]
    ConflictingOptions(String),

    /// The grid or property does not honour the grid capability contract.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    #[error("Stride must be at least 1, got {0}")]
    InvalidStride(usize),

    #[error("Invalid range ({min}, {max})")]
    InvalidRange { min: i64, max: i64 },

    /// Only raised for malformed input; degenerate input is handled by the caller.
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

pub type Result<T> = std::result::Result<T, GriddingError>;

impl GriddingError {
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch { expected: expected.to_vec(), actual: actual.to_vec() }
    }
}
