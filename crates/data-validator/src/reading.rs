//! Weather Reading and Model Selection

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Daily weather observation fed to the forecasting models
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherReading {
    tavg: f64,
    rh_avg: f64,
}

impl WeatherReading {
    /// Create a reading, rejecting non-finite values
    pub fn new(tavg: f64, rh_avg: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            tavg: finite("tavg", tavg)?,
            rh_avg: finite("rh_avg", rh_avg)?,
        })
    }

    /// Average temperature (°C)
    pub fn tavg(&self) -> f64 {
        self.tavg
    }

    /// Average relative humidity (%)
    pub fn rh_avg(&self) -> f64 {
        self.rh_avg
    }

    /// Features in training column order: `[TAVG, RH_AVG]`
    pub fn features(&self) -> [f64; 2] {
        [self.tavg, self.rh_avg]
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotANumber {
            field,
            raw: value.to_string(),
        })
    }
}

/// Numeric request field, sent either as a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Resolve to a finite `f64`
    pub fn resolve(&self, field: &'static str) -> Result<f64, ValidationError> {
        let value = match self {
            NumericInput::Number(value) => *value,
            NumericInput::Text(raw) => {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_| ValidationError::NotANumber {
                        field,
                        raw: raw.clone(),
                    })?
            }
        };
        finite(field, value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

/// Which forecasting model(s) a request runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelChoice {
    /// Sequence neural network only
    Sequence,
    /// Decomposition time-series model only
    Decomposition,
    /// Both models
    Both,
}

impl ModelChoice {
    /// Whether the sequence model runs
    pub fn runs_sequence(&self) -> bool {
        matches!(self, ModelChoice::Sequence | ModelChoice::Both)
    }

    /// Whether the decomposition model runs
    pub fn runs_decomposition(&self) -> bool {
        matches!(self, ModelChoice::Decomposition | ModelChoice::Both)
    }

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelChoice::Sequence => "lstm",
            ModelChoice::Decomposition => "prophet",
            ModelChoice::Both => "both",
        }
    }
}

impl FromStr for ModelChoice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lstm" | "sequence" => Ok(ModelChoice::Sequence),
            "prophet" | "decomposition" => Ok(ModelChoice::Decomposition),
            "both" => Ok(ModelChoice::Both),
            _ => Err(ValidationError::UnknownModel(s.to_string())),
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
