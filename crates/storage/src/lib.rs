//! Artifact Storage
//!
//! Process-wide cache for the pretrained artifacts and the historical dataset.
//! Every slot is loaded at most once per successful load and never evicted.

mod cache;
mod dataset;
mod loader;

pub use cache::{Artifact, ArtifactCache};
pub use dataset::{Cell, ChartSeries, DailyRecord, DatasetError, DatasetSummary, HistoricalDataset};
pub use loader::{ArtifactLoader, ArtifactPaths, FsArtifactLoader};

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Identity of a cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSlot {
    SequenceModel,
    DecompositionModel,
    FeatureScaler,
    TargetScaler,
    Dataset,
}

impl ArtifactSlot {
    /// Every slot, models first
    pub const ALL: [ArtifactSlot; 5] = [
        ArtifactSlot::SequenceModel,
        ArtifactSlot::DecompositionModel,
        ArtifactSlot::FeatureScaler,
        ArtifactSlot::TargetScaler,
        ArtifactSlot::Dataset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactSlot::SequenceModel => "sequence_model",
            ArtifactSlot::DecompositionModel => "decomposition_model",
            ArtifactSlot::FeatureScaler => "feature_scaler",
            ArtifactSlot::TargetScaler => "target_scaler",
            ArtifactSlot::Dataset => "dataset",
        }
    }
}

impl fmt::Display for ArtifactSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Artifact could not be loaded; the slot stays empty and the next access retries
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Failed to load {slot}: {cause}")]
pub struct LoadError {
    pub slot: ArtifactSlot,
    pub cause: String,
}

impl LoadError {
    pub fn new(slot: ArtifactSlot, cause: impl fmt::Display) -> Self {
        Self {
            slot,
            cause: cause.to_string(),
        }
    }
}
