//! Request Validation
//!
//! Turns raw prediction request fields into validated weather readings and model selections.

mod error;
mod reading;
mod validator;

pub use error::ValidationError;
pub use reading::{ModelChoice, NumericInput, WeatherReading};
pub use validator::{PredictionInput, ValidatedRequest, Validator};
