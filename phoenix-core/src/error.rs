//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum RolloutError {
    /// Evaluation requested before a policy and its observation statistics were loaded.
    #[error("Load model from disk before evaluation. Call load_file_from_disk")]
    NotReady,

    /// Dimensionality of an observation disagrees with the observation statistics.
    #[error("Shape mismatch: got shape={got:?} but expected last dimension {expected}")]
    ShapeMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Shape that was given.
        got: Vec<usize>,
    },

    /// Scaling parameters of a checkpoint are malformed.
    #[error("Invalid scaling parameters: {0}")]
    InvalidScalingParameters(String),

    /// Argument out of its domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
