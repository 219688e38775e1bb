//! Evaluation Metrics Route
//!
//! Offline test-set scores of both models, recorded when they were trained.

use axum::Json;
use serde::Serialize;

/// Error measures in mm/day
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelScores {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    pub lstm: ModelScores,
    pub prophet: ModelScores,
}

pub const EVALUATION_METRICS: EvaluationMetrics = EvaluationMetrics {
    lstm: ModelScores {
        mae: 7.8782,
        mse: 239.2603,
        rmse: 15.4680,
    },
    prophet: ModelScores {
        mae: 8.4301,
        mse: 252.5356,
        rmse: 15.8914,
    },
};

/// Get evaluation metrics
pub async fn get_evaluation_metrics() -> Json<EvaluationMetrics> {
    Json(EVALUATION_METRICS)
}
