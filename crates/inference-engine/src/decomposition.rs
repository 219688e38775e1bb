//! Decomposition Model
//!
//! Evaluates a fitted Prophet model from its exported parameters: a piecewise-linear
//! trend, Fourier seasonalities and standardized extra regressors. Matches Prophet's
//! `predict` for linear growth:
//!
//! `yhat = trend * (1 + multiplicative) + additive`

use crate::InferenceError;
use chrono::{NaiveDate, NaiveDateTime};
use feature_engine::FutureFrame;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Model producing a point forecast for one future row
pub trait DecompositionModel: Send + Sync {
    /// Forecast the frame's timestamp
    fn forecast(&self, frame: &FutureFrame) -> Result<DecompositionForecast, InferenceError>;
}

/// How a component combines with the trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentMode {
    Additive,
    Multiplicative,
}

/// Fourier seasonality with fitted coefficients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seasonality {
    pub name: String,
    /// Period in days
    pub period: f64,
    pub fourier_order: usize,
    pub mode: ComponentMode,
    /// Interleaved `[sin_1, cos_1, sin_2, cos_2, ...]`
    pub beta: Vec<f64>,
}

impl Seasonality {
    fn evaluate(&self, days_since_epoch: f64) -> f64 {
        (0..self.fourier_order)
            .map(|i| {
                let x = 2.0 * PI * (i + 1) as f64 * days_since_epoch / self.period;
                x.sin() * self.beta[2 * i] + x.cos() * self.beta[2 * i + 1]
            })
            .sum()
    }
}

/// Extra regressor with its standardization and coefficient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regressor {
    pub name: String,
    pub mu: f64,
    pub std: f64,
    pub mode: ComponentMode,
    pub beta: f64,
}

/// Point forecast with its components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecompositionForecast {
    pub yhat: f64,
    pub trend: f64,
    pub additive: f64,
    pub multiplicative: f64,
}

/// Exported parameters of a fitted linear-growth Prophet model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProphetModel {
    /// First timestamp of the training history
    pub start: NaiveDateTime,
    /// Length of the training history in days
    pub t_scale_days: f64,
    /// Scale applied to `y` during fitting
    pub y_scale: f64,
    pub k: f64,
    pub m: f64,
    /// Changepoint locations in scaled time
    #[serde(default)]
    pub changepoints_t: Vec<f64>,
    #[serde(default)]
    pub deltas: Vec<f64>,
    #[serde(default)]
    pub seasonalities: Vec<Seasonality>,
    #[serde(default)]
    pub regressors: Vec<Regressor>,
}

impl ProphetModel {
    /// Parse and validate a JSON parameter export
    pub fn from_json(raw: &str) -> Result<Self, InferenceError> {
        let model: ProphetModel =
            serde_json::from_str(raw).map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Check that parameter shapes are consistent
    pub fn validate(&self) -> Result<(), InferenceError> {
        let invalid = |msg: String| Err(InferenceError::ModelLoadError(msg));

        if !(self.t_scale_days > 0.0) || !self.y_scale.is_finite() {
            return invalid("t_scale_days must be positive and y_scale finite".to_string());
        }
        if self.changepoints_t.len() != self.deltas.len() {
            return invalid(format!(
                "{} changepoints but {} deltas",
                self.changepoints_t.len(),
                self.deltas.len()
            ));
        }
        for s in &self.seasonalities {
            if s.beta.len() != 2 * s.fourier_order || !(s.period > 0.0) {
                return invalid(format!(
                    "seasonality '{}' needs {} coefficients and a positive period",
                    s.name,
                    2 * s.fourier_order
                ));
            }
        }
        for r in &self.regressors {
            if r.std == 0.0 || !r.std.is_finite() {
                return invalid(format!("regressor '{}' has zero standard deviation", r.name));
            }
        }
        Ok(())
    }

    /// Piecewise-linear trend in scaled time, before `y_scale`
    fn trend(&self, t: f64) -> f64 {
        let (k, m) = self
            .changepoints_t
            .iter()
            .zip(&self.deltas)
            .filter(|(cp, _)| t >= **cp)
            .fold((self.k, self.m), |(k, m), (cp, delta)| (k + delta, m - cp * delta));
        k * t + m
    }

    fn scaled_time(&self, ds: NaiveDateTime) -> f64 {
        (ds - self.start).num_seconds() as f64 / (self.t_scale_days * SECONDS_PER_DAY)
    }
}

fn days_since_epoch(ds: NaiveDateTime) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    (ds - epoch).num_seconds() as f64 / SECONDS_PER_DAY
}

impl DecompositionModel for ProphetModel {
    fn forecast(&self, frame: &FutureFrame) -> Result<DecompositionForecast, InferenceError> {
        let t = self.scaled_time(frame.ds);
        let trend = self.trend(t) * self.y_scale;

        let mut additive = 0.0;
        let mut multiplicative = 0.0;

        let days = days_since_epoch(frame.ds);
        for s in &self.seasonalities {
            let value = s.evaluate(days);
            match s.mode {
                ComponentMode::Additive => additive += value,
                ComponentMode::Multiplicative => multiplicative += value,
            }
        }

        for r in &self.regressors {
            let raw = frame.regressor(&r.name).ok_or_else(|| InferenceError::InvalidInputShape {
                expected: format!("regressor column '{}'", r.name),
                actual: "TAVG, RH_AVG".to_string(),
            })?;
            let value = (raw - r.mu) / r.std * r.beta;
            match r.mode {
                ComponentMode::Additive => additive += value,
                ComponentMode::Multiplicative => multiplicative += value,
            }
        }

        let additive = additive * self.y_scale;
        let yhat = trend * (1.0 + multiplicative) + additive;
        debug!(t, trend, additive, multiplicative, yhat, "Decomposition forecast");

        Ok(DecompositionForecast {
            yhat,
            trend,
            additive,
            multiplicative,
        })
    }
}
