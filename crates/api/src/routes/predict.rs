//! Prediction Route

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use data_validator::PredictionInput;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::orchestrator::{ForecastResult, ModelFailure, PredictionOutcome};
use crate::AppState;

/// One model's entry in the response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelEntry {
    Success {
        /// Rainfall in mm, two decimals
        prediction: String,
        category: &'static str,
        severity_tag: &'static str,
        range_desc: &'static str,
        color: &'static str,
    },
    Failure {
        error: String,
    },
}

impl From<&Result<ForecastResult, ModelFailure>> for ModelEntry {
    fn from(result: &Result<ForecastResult, ModelFailure>) -> Self {
        match result {
            Ok(forecast) => ModelEntry::Success {
                prediction: format!("{:.2}", forecast.rainfall_mm),
                category: forecast.category.label,
                severity_tag: forecast.category.severity_tag,
                range_desc: forecast.category.range_desc,
                color: forecast.category.color,
            },
            Err(e) => ModelEntry::Failure { error: e.to_string() },
        }
    }
}

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lstm: Option<ModelEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prophet: Option<ModelEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,
}

impl From<&PredictionOutcome> for PredictionResponse {
    fn from(outcome: &PredictionOutcome) -> Self {
        Self {
            lstm: outcome.sequence.as_ref().map(ModelEntry::from),
            prophet: outcome.decomposition.as_ref().map(ModelEntry::from),
            ai_explanation: outcome.narration.clone(),
        }
    }
}

/// Predict rainfall for one reading.
///
/// 200 when at least one requested model succeeded, 502 when all failed, 400 on bad input.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PredictionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<PredictionResponse>), ApiError> {
    let request_id = Uuid::new_v4();
    handle_predict(state, body)
        .instrument(info_span!("predict", %request_id))
        .await
}

async fn handle_predict(
    state: Arc<AppState>,
    body: Result<Json<PredictionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<PredictionResponse>), ApiError> {
    let Json(input) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = state.validator.validate_request(&input)?;

    let outcome = state.predictor.predict(&request).await;
    let status = if outcome.all_failed() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(PredictionResponse::from(&outcome))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::ModelKind;
    use rain_category::categorize;
    use storage::{ArtifactSlot, LoadError};

    #[test]
    fn test_success_entry_shape() {
        let result = Ok(ForecastResult {
            model: ModelKind::Sequence,
            rainfall_mm: 8.126,
            category: categorize(8.126),
        });
        let value = serde_json::to_value(ModelEntry::from(&result)).unwrap();
        assert_eq!(value["prediction"], "8.13");
        assert_eq!(value["severity_tag"], "light");
        assert_eq!(value["range_desc"], "0.5 - 20 mm/hari");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_failure_entry_shape() {
        let result: Result<ForecastResult, ModelFailure> =
            Err(LoadError::new(ArtifactSlot::DecompositionModel, "no such file").into());
        let value = serde_json::to_value(ModelEntry::from(&result)).unwrap();
        let error = value["error"].as_str().unwrap();
        assert!(error.contains("no such file"));
        assert!(value.get("prediction").is_none());
    }

    #[test]
    fn test_unrequested_models_are_omitted() {
        let outcome = PredictionOutcome {
            sequence: None,
            decomposition: Some(Ok(ForecastResult {
                model: ModelKind::Decomposition,
                rainfall_mm: 0.2,
                category: categorize(0.2),
            })),
            narration: None,
        };
        let value = serde_json::to_value(PredictionResponse::from(&outcome)).unwrap();
        assert!(value.get("lstm").is_none());
        assert!(value.get("ai_explanation").is_none());
        assert_eq!(value["prophet"]["prediction"], "0.20");
        assert_eq!(value["prophet"]["severity_tag"], "none");
    }
}
