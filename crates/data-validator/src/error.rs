//! Validation Error Types

use thiserror::Error;

/// Errors during request validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value is not a finite number
    #[error("{field} must be a finite number, got '{raw}'")]
    NotANumber { field: &'static str, raw: String },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Unrecognised model selection
    #[error("Unknown model '{0}', expected one of: lstm, prophet, both")]
    UnknownModel(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
