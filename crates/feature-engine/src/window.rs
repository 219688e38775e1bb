//! Sequence Model Input Window

use crate::scaler::FeatureScaler;
use crate::TransformError;
use data_validator::WeatherReading;
use tracing::debug;

/// Timesteps the sequence model was trained on
pub const SEQUENCE_LENGTH: usize = 7;

/// Features per timestep: TAVG, RH_AVG
pub const N_FEATURES: usize = 2;

/// Scaled input window of shape `(1, SEQUENCE_LENGTH, N_FEATURES)`.
///
/// Without real history the single reading is repeated across every timestep,
/// so this is a steady-state approximation rather than a temporal forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceWindow {
    values: Vec<f32>,
}

impl SequenceWindow {
    /// Scale a reading and replicate it over the window
    pub fn from_reading(reading: &WeatherReading, scaler: &FeatureScaler) -> Result<Self, TransformError> {
        let scaled = scaler.transform(&reading.features())?;
        if scaled.len() != N_FEATURES {
            return Err(TransformError::FeatureCountMismatch {
                expected: N_FEATURES,
                actual: scaled.len(),
            });
        }

        let step: Vec<f32> = scaled.iter().map(|v| *v as f32).collect();
        let values = step.repeat(SEQUENCE_LENGTH);
        debug!("Built sequence window from scaled step {:?}", step);

        Ok(Self { values })
    }

    /// Tensor shape
    pub fn shape(&self) -> [usize; 3] {
        [1, SEQUENCE_LENGTH, N_FEATURES]
    }

    /// Row-major values
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Features at a timestep
    pub fn step(&self, t: usize) -> Option<&[f32]> {
        if t >= SEQUENCE_LENGTH {
            return None;
        }
        Some(&self.values[t * N_FEATURES..(t + 1) * N_FEATURES])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> FeatureScaler {
        FeatureScaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        }
    }

    #[test]
    fn test_window_shape() {
        let reading = WeatherReading::new(25.0, 80.0).unwrap();
        let window = SequenceWindow::from_reading(&reading, &identity()).unwrap();
        assert_eq!(window.shape(), [1, 7, 2]);
        assert_eq!(window.as_slice().len(), 14);
    }

    #[test]
    fn test_steps_are_identical() {
        let scaler = FeatureScaler::MinMax {
            min: vec![-2.0, -1.5],
            scale: vec![0.1, 0.025],
        };
        let reading = WeatherReading::new(26.0, 90.0).unwrap();
        let window = SequenceWindow::from_reading(&reading, &scaler).unwrap();

        let first = window.step(0).unwrap().to_vec();
        assert!((first[0] - 0.6).abs() < 1e-6);
        assert!((first[1] - 0.75).abs() < 1e-6);
        for t in 1..SEQUENCE_LENGTH {
            assert_eq!(window.step(t).unwrap(), first.as_slice());
        }
        assert!(window.step(SEQUENCE_LENGTH).is_none());
    }

    #[test]
    fn test_wrong_scaler_width() {
        let scaler = FeatureScaler::Standard {
            mean: vec![0.0],
            scale: vec![1.0],
        };
        let reading = WeatherReading::new(25.0, 80.0).unwrap();
        assert!(SequenceWindow::from_reading(&reading, &scaler).is_err());
    }
}
