//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum CoreError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),

    /// The bound arrays of a space have different lengths.
    #[error("Space shape mismatch: low has {low} elements, high has {high}")]
    SpaceShapeMismatch {
        /// Length of the lower bound array.
        low: usize,
        /// Length of the upper bound array.
        high: usize,
    },

    /// A bound pair is not finite or not ordered.
    #[error("Invalid space bound at index {index}: [{low}, {high}]")]
    InvalidSpaceBound {
        /// Index of the offending element.
        index: usize,
        /// Lower bound.
        low: f32,
        /// Upper bound.
        high: f32,
    },
}
