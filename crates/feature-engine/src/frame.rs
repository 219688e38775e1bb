//! Decomposition Model Input Frame

use chrono::{NaiveDate, NaiveDateTime};
use data_validator::WeatherReading;
use serde::Serialize;

/// One-row future frame: forecast timestamp plus covariates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FutureFrame {
    pub ds: NaiveDateTime,
    #[serde(rename = "TAVG")]
    pub tavg: f64,
    #[serde(rename = "RH_AVG")]
    pub rh_avg: f64,
}

impl FutureFrame {
    /// Frame for a calendar day at midnight, matching the daily training data
    pub fn for_date(reading: &WeatherReading, date: NaiveDate) -> Self {
        Self {
            ds: date.and_hms_opt(0, 0, 0).unwrap_or_default(),
            tavg: reading.tavg(),
            rh_avg: reading.rh_avg(),
        }
    }

    /// Covariate value by training column name
    pub fn regressor(&self, name: &str) -> Option<f64> {
        match name {
            "TAVG" => Some(self.tavg),
            "RH_AVG" => Some(self.rh_avg),
            _ => None,
        }
    }
}
