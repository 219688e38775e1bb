//! Feature Engineering
//!
//! Scales weather readings with the training-time scalers and assembles the input
//! shapes each forecasting model expects.

mod frame;
mod scaler;
mod window;

pub use frame::FutureFrame;
pub use scaler::FeatureScaler;
pub use window::{SequenceWindow, N_FEATURES, SEQUENCE_LENGTH};

use thiserror::Error;

/// Errors while transforming features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Scaler expects {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },
    #[error("Invalid scaler parameters: {0}")]
    InvalidScaler(String),
    #[error("Transform produced a non-finite value at feature {0}")]
    NonFinite(usize),
}
