//! Rainfall Prediction API Server
//!
//! JSON HTTP server for the Citeko rainfall forecast dashboard: model
//! predictions with narration, dataset views and service health.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod rate_limit;
mod routes;

pub use config::AppConfig;
pub use orchestrator::{ForecastResult, ModelFailure, PredictionOutcome, Predictor};
pub use rate_limit::{create_governor_config, DefaultGovernorConfig, RateLimitConfig};
pub use routes::evaluation::{EvaluationMetrics, ModelScores, EVALUATION_METRICS};
pub use routes::predict::{ModelEntry, PredictionResponse};

use data_validator::Validator;
use narration::{GeminiClient, NarrationProvider};
use storage::{ArtifactCache, FsArtifactLoader};

/// Application state shared across handlers
pub struct AppState {
    pub predictor: Predictor,
    pub validator: Validator,
    pub config: AppConfig,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus exporter; `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(predictor: Predictor, config: AppConfig) -> Self {
        Self {
            predictor,
            validator: Validator::new(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Both models and their scalers are in memory
    pub models_loaded: bool,
    /// Load state per artifact slot
    pub artifacts: BTreeMap<&'static str, bool>,
    /// Resident set size, two decimals; absent where `/proc` is unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_usage_mb: Option<String>,
}

/// Create the application router.
///
/// `governor` rate-limits the predict route when present.
pub fn create_router(state: Arc<AppState>, governor: Option<Arc<DefaultGovernorConfig>>) -> Router {
    let mut predict = Router::new().route("/predict", post(routes::predict::predict));
    if let Some(config) = governor {
        predict = predict.layer(GovernorLayer { config });
    }

    Router::new()
        .merge(predict)
        .route("/health", get(health_handler))
        .route("/api/evaluation-metrics", get(routes::evaluation::get_evaluation_metrics))
        .route("/api/data", get(routes::data::get_data))
        .route("/api/chart-data", get(routes::data::get_chart_data))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cache = state.predictor.cache();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models_loaded: cache.models_loaded(),
        artifacts: cache
            .status()
            .into_iter()
            .map(|(slot, loaded)| (slot.as_str(), loaded))
            .collect(),
        memory_usage_mb: process_rss_bytes().map(|bytes| format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))),
    })
}

/// Resident memory of this process, from `/proc/self/status`
fn process_rss_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss(&status)
}

fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

/// Prometheus exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed".to_string()),
    }
}

/// Filter for `level`, which may be a bare level or directives such as `info,storage=debug`
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging, falling back to INFO when `level` does not parse
pub fn init_logging(level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(level))
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

/// Build the shared prediction service from configuration
pub fn build_predictor(config: &AppConfig) -> anyhow::Result<Predictor> {
    let loader = Arc::new(FsArtifactLoader::new(config.artifacts.clone()));
    let cache = Arc::new(ArtifactCache::new(loader));

    let client = GeminiClient::new(config.narration.clone())?;
    let narrator: Option<Arc<dyn NarrationProvider>> = if client.is_available() {
        Some(Arc::new(client))
    } else {
        None
    };

    Ok(Predictor::new(
        cache,
        narrator,
        config.narration.timeout(),
        config.narration.location.clone(),
    ))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    let predictor = build_predictor(&config)?;

    if config.preload_models {
        let cache = Arc::clone(predictor.cache());
        tokio::task::spawn_blocking(move || {
            let failures = cache.warm();
            if failures.is_empty() {
                info!("All models preloaded");
            } else {
                for failure in failures {
                    warn!("Preload failed, will retry on request: {}", failure);
                }
            }
        });
    }

    let governor = create_governor_config(&config.rate_limit);
    if governor.is_none() {
        warn!("Rate limit quota {:?} is invalid; predict route is unlimited", config.rate_limit);
    }

    let addr: SocketAddr = config.bind_addr.parse()?;
    let state = Arc::new(AppState::new(predictor, config).with_metrics(handle));
    let app = create_router(state, governor);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_parse_vm_rss() {
        let status = "Name:\trainfall-server\nVmPeak:\t  204800 kB\nVmRSS:\t   51200 kB\nThreads:\t9\n";
        assert_eq!(parse_vm_rss(status), Some(51200 * 1024));
        assert_eq!(parse_vm_rss("Name:\tx\n"), None);
        assert_eq!(parse_vm_rss("VmRSS:\tlots kB\n"), None);
    }

    #[test]
    fn test_log_filter_directives() {
        assert_eq!(log_filter("warn").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            log_filter("info,storage=debug").max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }
}
