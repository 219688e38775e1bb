//! Prediction Request Validator

use crate::error::ValidationError;
use crate::reading::{ModelChoice, NumericInput, WeatherReading};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

/// Raw prediction request as received from the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionInput {
    pub tavg: Option<NumericInput>,
    pub rh_avg: Option<NumericInput>,
    pub model: Option<String>,
    /// Forecast date (`YYYY-MM-DD`) for the decomposition model
    pub date: Option<String>,
}

/// Request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub reading: WeatherReading,
    pub model: ModelChoice,
    pub date: Option<NaiveDate>,
}

/// Validator for prediction requests.
///
/// Any finite `tavg`/`rh_avg` is accepted; the models extrapolate outside the training range.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a full prediction request, stopping at the first error
    pub fn validate_request(&self, input: &PredictionInput) -> Result<ValidatedRequest, ValidationError> {
        let tavg = input
            .tavg
            .as_ref()
            .ok_or(ValidationError::MissingField("tavg"))?
            .resolve("tavg")?;
        let rh_avg = input
            .rh_avg
            .as_ref()
            .ok_or(ValidationError::MissingField("rh_avg"))?
            .resolve("rh_avg")?;

        let model = input
            .model
            .as_deref()
            .ok_or(ValidationError::MissingField("model"))?
            .parse::<ModelChoice>()?;

        let date = input
            .date
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                    ValidationError::InvalidFormat(format!("date '{}': {}", raw, e))
                })
            })
            .transpose()?;

        debug!(tavg, rh_avg, %model, "Request validated");

        Ok(ValidatedRequest {
            reading: WeatherReading::new(tavg, rh_avg)?,
            model,
            date,
        })
    }
}
