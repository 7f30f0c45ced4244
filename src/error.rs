//! Error types for the modeling toolkit

use thiserror::Error;

/// Result type alias for toolkit operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Main error type for the toolkit
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Predict or evaluate was called before the model was fitted
    #[error("Model not fitted")]
    UntrainedModel,

    /// Feature count or sequence length disagreement
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Input that makes the computation undefined (empty data, zero variance, divergence)
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },
}

impl ModelError {
    /// Shorthand for a length mismatch between two sequences
    pub(crate) fn length_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        ModelError::DimensionMismatch {
            expected: format!("{} = {}", what, expected),
            actual: format!("{} = {}", what, actual),
        }
    }

    pub(crate) fn invalid_parameter(
        name: &str,
        value: impl std::fmt::Display,
        reason: &str,
    ) -> Self {
        ModelError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<ndarray::ShapeError> for ModelError {
    fn from(err: ndarray::ShapeError) -> Self {
        ModelError::DimensionMismatch {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
