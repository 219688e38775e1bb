//! Inference Adapters
//!
//! Pure functions over borrowed artifacts: identical inputs always give identical outputs.

use crate::decomposition::DecompositionModel;
use crate::sequence::SequenceModel;
use crate::InferenceError;
use chrono::NaiveDate;
use data_validator::WeatherReading;
use feature_engine::{FeatureScaler, FutureFrame, SequenceWindow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Forecasting model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Sequence neural network
    Sequence,
    /// Trend/seasonality decomposition model
    Decomposition,
}

impl ModelKind {
    /// Wire name used in responses
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Sequence => "lstm",
            ModelKind::Decomposition => "prophet",
        }
    }

    /// Name shown to people
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Sequence => "LSTM",
            ModelKind::Decomposition => "Prophet",
        }
    }
}

/// Undo the `log1p` applied to rainfall during training
pub fn inverse_log(x: f64) -> f64 {
    x.exp_m1()
}

fn finite(value: f64) -> Result<f64, InferenceError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InferenceError::NonFiniteOutput(value))
    }
}

/// Run the sequence model for one reading, returning rainfall in mm
pub fn predict_sequence(
    model: &dyn SequenceModel,
    feature_scaler: &FeatureScaler,
    target_scaler: &FeatureScaler,
    reading: &WeatherReading,
) -> Result<f64, InferenceError> {
    let window = SequenceWindow::from_reading(reading, feature_scaler)?;
    let scaled = model.forward(&window)?;
    let log_rainfall = target_scaler
        .inverse_transform(&[scaled])?
        .first()
        .copied()
        .ok_or_else(|| InferenceError::InferenceFailed("target scaler returned no value".to_string()))?;
    let rainfall = finite(inverse_log(log_rainfall))?;

    debug!(scaled, log_rainfall, rainfall, "Sequence prediction");
    Ok(rainfall)
}

/// Run the decomposition model for one reading on a given day, returning rainfall in mm
pub fn predict_decomposition(
    model: &dyn DecompositionModel,
    reading: &WeatherReading,
    date: NaiveDate,
) -> Result<f64, InferenceError> {
    let frame = FutureFrame::for_date(reading, date);
    let forecast = model.forecast(&frame)?;
    let rainfall = finite(inverse_log(finite(forecast.yhat)?))?;

    debug!(yhat = forecast.yhat, rainfall, %date, "Decomposition prediction");
    Ok(rainfall)
}
