//! Rainfall Inference Engine
//!
//! Runs the two pretrained forecasting models and undoes the training-time target transforms.

mod decomposition;
mod engine;
mod sequence;

pub use decomposition::{ComponentMode, DecompositionForecast, DecompositionModel, ProphetModel, Regressor, Seasonality};
pub use engine::{inverse_log, predict_decomposition, predict_sequence, ModelKind};
pub use sequence::{OnnxSequenceModel, SequenceModel};

use feature_engine::TransformError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Feature transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("Model produced a non-finite prediction: {0}")]
    NonFiniteOutput(f64),
}
