//! Prediction Orchestrator
//!
//! Runs the requested models against the shared artifact cache, isolates their
//! failures from each other, and adds a narration under a deadline.

use chrono::{NaiveDate, Utc};
use data_validator::{ModelChoice, ValidatedRequest, WeatherReading};
use inference_engine::{InferenceError, ModelKind};
use narration::{comparison_prompt, single_prompt, ForecastSummary, NarrationError, NarrationProvider, PromptContext};
use rain_category::{categorize, CategoryInfo};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::{ArtifactCache, LoadError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a single model produced no forecast
#[derive(Debug, Error)]
pub enum ModelFailure {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Sequence model forecast in mm, loading its artifacts on first use. Blocking.
pub fn predict_sequence(cache: &ArtifactCache, reading: &WeatherReading) -> Result<f64, ModelFailure> {
    let model = cache.sequence_model()?;
    let feature_scaler = cache.feature_scaler()?;
    let target_scaler = cache.target_scaler()?;
    Ok(inference_engine::predict_sequence(
        model.as_ref(),
        &feature_scaler,
        &target_scaler,
        reading,
    )?)
}

/// Decomposition model forecast in mm for `date`, loading the model on first use. Blocking.
pub fn predict_decomposition(
    cache: &ArtifactCache,
    reading: &WeatherReading,
    date: NaiveDate,
) -> Result<f64, ModelFailure> {
    let model = cache.decomposition_model()?;
    Ok(inference_engine::predict_decomposition(model.as_ref(), reading, date)?)
}

/// One model's categorized forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub model: ModelKind,
    pub rainfall_mm: f64,
    pub category: CategoryInfo,
}

impl ForecastResult {
    fn new(model: ModelKind, rainfall_mm: f64) -> Self {
        Self {
            model,
            rainfall_mm,
            category: categorize(rainfall_mm),
        }
    }

    fn summary(&self) -> ForecastSummary<'_> {
        ForecastSummary {
            model_name: self.model.display_name(),
            rainfall_mm: self.rainfall_mm,
            category: self.category.label,
        }
    }
}

/// Result of a prediction request; `None` means the model was not requested
#[derive(Debug)]
pub struct PredictionOutcome {
    pub sequence: Option<Result<ForecastResult, ModelFailure>>,
    pub decomposition: Option<Result<ForecastResult, ModelFailure>>,
    pub narration: Option<String>,
}

impl PredictionOutcome {
    fn results(&self) -> impl Iterator<Item = &Result<ForecastResult, ModelFailure>> {
        self.sequence.iter().chain(self.decomposition.iter())
    }

    /// Successful forecasts, sequence model first
    pub fn successes(&self) -> Vec<&ForecastResult> {
        self.results().filter_map(|r| r.as_ref().ok()).collect()
    }

    /// Every requested model failed
    pub fn all_failed(&self) -> bool {
        self.results().all(|r| r.is_err())
    }
}

/// Shared prediction service
pub struct Predictor {
    cache: Arc<ArtifactCache>,
    narrator: Option<Arc<dyn NarrationProvider>>,
    narration_timeout: Duration,
    location: String,
}

impl Predictor {
    pub fn new(
        cache: Arc<ArtifactCache>,
        narrator: Option<Arc<dyn NarrationProvider>>,
        narration_timeout: Duration,
        location: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            narrator,
            narration_timeout,
            location: location.into(),
        }
    }

    pub fn cache(&self) -> &Arc<ArtifactCache> {
        &self.cache
    }

    /// Run a validated request end to end
    pub async fn predict(&self, request: &ValidatedRequest) -> PredictionOutcome {
        let reading = request.reading;
        let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
        let choice = request.model;

        let (sequence, decomposition) = tokio::join!(
            self.run_if(choice.runs_sequence(), ModelKind::Sequence, reading, date),
            self.run_if(choice.runs_decomposition(), ModelKind::Decomposition, reading, date),
        );

        let mut outcome = PredictionOutcome {
            sequence,
            decomposition,
            narration: None,
        };
        outcome.narration = self.narrate(&reading, choice, &outcome).await;

        info!(
            model = %choice,
            succeeded = outcome.successes().len(),
            narrated = outcome.narration.is_some(),
            "Prediction finished"
        );
        outcome
    }

    async fn run_if(
        &self,
        requested: bool,
        kind: ModelKind,
        reading: WeatherReading,
        date: NaiveDate,
    ) -> Option<Result<ForecastResult, ModelFailure>> {
        if !requested {
            return None;
        }
        Some(self.run_model(kind, reading, date).await)
    }

    async fn run_model(
        &self,
        kind: ModelKind,
        reading: WeatherReading,
        date: NaiveDate,
    ) -> Result<ForecastResult, ModelFailure> {
        let cache = Arc::clone(&self.cache);
        let start = Instant::now();

        let result = tokio::task::spawn_blocking(move || match kind {
            ModelKind::Sequence => predict_sequence(&cache, &reading),
            ModelKind::Decomposition => predict_decomposition(&cache, &reading, date),
        })
        .await
        .unwrap_or_else(|e| {
            Err(InferenceError::InferenceFailed(format!("inference task aborted: {}", e)).into())
        });

        metrics::histogram!("rainfall_inference_seconds", "model" => kind.as_str())
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(rainfall_mm) => {
                metrics::counter!("rainfall_predictions_total", "model" => kind.as_str(), "outcome" => "ok")
                    .increment(1);
                debug!(model = kind.as_str(), rainfall_mm, "Model succeeded");
                Ok(ForecastResult::new(kind, rainfall_mm))
            }
            Err(e) => {
                metrics::counter!("rainfall_predictions_total", "model" => kind.as_str(), "outcome" => "error")
                    .increment(1);
                warn!(model = kind.as_str(), error = %e, "Model failed");
                Err(e)
            }
        }
    }

    async fn narrate(
        &self,
        reading: &WeatherReading,
        choice: ModelChoice,
        outcome: &PredictionOutcome,
    ) -> Option<String> {
        let narrator = self.narrator.as_ref().filter(|n| n.is_available())?;

        let ctx = PromptContext {
            location: &self.location,
            tavg: reading.tavg(),
            rh_avg: reading.rh_avg(),
        };
        let prompt = match (choice, outcome.successes().as_slice()) {
            (_, []) => return None,
            (ModelChoice::Both, [first, second]) => comparison_prompt(&ctx, &first.summary(), &second.summary()),
            (_, [primary, ..]) => single_prompt(&ctx, &primary.summary()),
        };

        let result = match tokio::time::timeout(self.narration_timeout, narrator.generate(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(NarrationError::Timeout(self.narration_timeout.as_millis() as u64)),
        };

        match result {
            Ok(text) => {
                metrics::counter!("rainfall_narrations_total", "outcome" => "ok").increment(1);
                Some(text)
            }
            Err(e) => {
                let outcome = if matches!(e, NarrationError::Timeout(_)) { "timeout" } else { "error" };
                metrics::counter!("rainfall_narrations_total", "outcome" => outcome).increment(1);
                warn!(error = %e, "Narration omitted");
                None
            }
        }
    }
}
