//! Historical Data Routes

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::sync::Arc;
use storage::{ChartSeries, DatasetSummary};
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Rows returned in the table view
pub const TABLE_ROWS: usize = 100;
/// Sampling stride of the chart view
pub const CHART_STEP: usize = 10;

/// Response for the dataset endpoint
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub summary: DatasetSummary,
    pub table: Vec<Map<String, Value>>,
    pub chart: ChartSeries,
}

/// Get dataset summary, table and chart series
pub async fn get_data(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse>, ApiError> {
    let cache = Arc::clone(state.predictor.cache());
    let dataset = tokio::task::spawn_blocking(move || cache.dataset())
        .await
        .map_err(|e| ApiError::Internal(format!("dataset task aborted: {}", e)))??;

    debug!("Serving dataset view over {} records", dataset.len());
    Ok(Json(DataResponse {
        summary: dataset.summary(),
        table: dataset.table(TABLE_ROWS),
        chart: dataset.chart(CHART_STEP),
    }))
}

/// Serve the pre-exported model chart file
pub async fn get_chart_data(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let path = &state.config.artifacts.chart_data;
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ApiError::NotFound("Chart data not found".to_string()),
        _ => ApiError::Internal(format!("Failed to read {}: {}", path.display(), e)),
    })?;

    let value = serde_json::from_str(&raw)
        .map_err(|e| ApiError::Internal(format!("Invalid chart data in {}: {}", path.display(), e)))?;
    Ok(Json(value))
}
