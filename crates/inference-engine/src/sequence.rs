//! Sequence Model (ONNX via tract)

use crate::InferenceError;
use feature_engine::{SequenceWindow, N_FEATURES, SEQUENCE_LENGTH};
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type RunnablePlan = SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>;

/// Model mapping a scaled window to a single scaled rainfall value
pub trait SequenceModel: Send + Sync {
    /// Deterministic forward pass
    fn forward(&self, window: &SequenceWindow) -> Result<f64, InferenceError>;
}

/// Sequence network exported to ONNX, optimized once at load
pub struct OnnxSequenceModel {
    plan: RunnablePlan,
    model_path: String,
}

impl std::fmt::Debug for OnnxSequenceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSequenceModel")
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OnnxSequenceModel {
    /// Load and optimize an ONNX graph with a fixed `(1, 7, 2)` input
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading sequence model from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, SEQUENCE_LENGTH, N_FEATURES]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        info!("Sequence model loaded successfully");
        Ok(Self {
            plan,
            model_path: path.display().to_string(),
        })
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }
}

impl SequenceModel for OnnxSequenceModel {
    fn forward(&self, window: &SequenceWindow) -> Result<f64, InferenceError> {
        let [batch, steps, features] = window.shape();
        let array = tract_ndarray::Array3::from_shape_vec(
            (batch, steps, features),
            window.as_slice().to_vec(),
        )
        .map_err(|e| InferenceError::InvalidInputShape {
            expected: format!("{:?}", window.shape()),
            actual: e.to_string(),
        })?;
        let input: Tensor = array.into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model returned no outputs".to_string()))?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let value = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| InferenceError::InvalidInputShape {
                expected: "at least one output value".to_string(),
                actual: format!("{:?}", view.shape()),
            })?;

        debug!("Sequence model raw output: {}", value);
        Ok(value as f64)
    }
}
