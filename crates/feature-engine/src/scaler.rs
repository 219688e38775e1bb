//! Fitted Feature Scalers
//!
//! Parameters are exported from the scikit-learn scalers fitted during training.
//! Nothing here fits a scaler; it only applies the stored parameters.

use crate::TransformError;
use serde::{Deserialize, Serialize};

/// Scaler with fitted per-feature parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    /// `x' = x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    /// `x' = (x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
}

impl FeatureScaler {
    /// Parse and validate a JSON export
    pub fn from_json(raw: &str) -> Result<Self, TransformError> {
        let scaler: FeatureScaler =
            serde_json::from_str(raw).map_err(|e| TransformError::InvalidScaler(e.to_string()))?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Check parameter shapes and reject degenerate scales
    pub fn validate(&self) -> Result<(), TransformError> {
        let (offset, scale) = self.params();
        if offset.is_empty() {
            return Err(TransformError::InvalidScaler("no features".to_string()));
        }
        if offset.len() != scale.len() {
            return Err(TransformError::InvalidScaler(format!(
                "offset has {} entries, scale has {}",
                offset.len(),
                scale.len()
            )));
        }
        if let Some(idx) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
            return Err(TransformError::InvalidScaler(format!(
                "scale[{}] must be finite and non-zero",
                idx
            )));
        }
        if offset.iter().any(|o| !o.is_finite()) {
            return Err(TransformError::InvalidScaler("offset contains non-finite values".to_string()));
        }
        Ok(())
    }

    /// Number of features the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.params().0.len()
    }

    /// Scale raw values into model space
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, TransformError> {
        self.check_len(values)?;
        let out: Vec<f64> = match self {
            FeatureScaler::MinMax { min, scale } => values
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
            FeatureScaler::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
        };
        ensure_finite(out)
    }

    /// Map model-space values back to raw units
    pub fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>, TransformError> {
        self.check_len(values)?;
        let out: Vec<f64> = match self {
            FeatureScaler::MinMax { min, scale } => values
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| (x - m) / s)
                .collect(),
            FeatureScaler::Standard { mean, scale } => values
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };
        ensure_finite(out)
    }

    fn params(&self) -> (&[f64], &[f64]) {
        match self {
            FeatureScaler::MinMax { min, scale } => (min, scale),
            FeatureScaler::Standard { mean, scale } => (mean, scale),
        }
    }

    fn check_len(&self, values: &[f64]) -> Result<(), TransformError> {
        let expected = self.n_features();
        if values.len() != expected {
            return Err(TransformError::FeatureCountMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(())
    }
}

fn ensure_finite(values: Vec<f64>) -> Result<Vec<f64>, TransformError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(TransformError::NonFinite(idx)),
        None => Ok(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_min_max_matches_sklearn() {
        // fitted on TAVG in [20, 30], RH_AVG in [60, 100]
        let scaler = FeatureScaler::MinMax {
            min: vec![-2.0, -1.5],
            scale: vec![0.1, 0.025],
        };
        let scaled = scaler.transform(&[25.0, 80.0]).unwrap();
        assert!((scaled[0] - 0.5).abs() < 1e-12);
        assert!((scaled[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_standard_scaler() {
        let scaler = FeatureScaler::Standard {
            mean: vec![1.2],
            scale: vec![0.8],
        };
        let scaled = scaler.transform(&[2.0]).unwrap();
        assert!((scaled[0] - 1.0).abs() < 1e-12);
        let raw = scaler.inverse_transform(&[1.0]).unwrap();
        assert!((raw[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_json() {
        let scaler =
            FeatureScaler::from_json(r#"{"kind":"min_max","min":[-2.0,-1.5],"scale":[0.1,0.025]}"#).unwrap();
        assert_eq!(scaler.n_features(), 2);

        assert!(FeatureScaler::from_json(r#"{"kind":"standard","mean":[0.0],"scale":[0.0]}"#).is_err());
        assert!(FeatureScaler::from_json(r#"{"kind":"standard","mean":[0.0,1.0],"scale":[1.0]}"#).is_err());
        assert!(FeatureScaler::from_json(r#"{"kind":"robust","center":[0.0]}"#).is_err());
    }

    #[test]
    fn test_feature_count_mismatch() {
        let scaler = FeatureScaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        assert_eq!(
            scaler.transform(&[1.0]),
            Err(TransformError::FeatureCountMismatch { expected: 2, actual: 1 })
        );
    }

    proptest! {
        #[test]
        fn prop_inverse_undoes_transform(
            x in -100.0f64..100.0,
            offset in -10.0f64..10.0,
            scale in 0.01f64..10.0,
        ) {
            for scaler in [
                FeatureScaler::MinMax { min: vec![offset], scale: vec![scale] },
                FeatureScaler::Standard { mean: vec![offset], scale: vec![scale] },
            ] {
                let scaled = scaler.transform(&[x]).unwrap();
                let back = scaler.inverse_transform(&scaled).unwrap();
                prop_assert!((back[0] - x).abs() < 1e-9);
            }
        }
    }
}
