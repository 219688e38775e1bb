//! Artifact Loaders

use crate::dataset::HistoricalDataset;
use crate::{ArtifactSlot, LoadError};
use feature_engine::FeatureScaler;
use inference_engine::{DecompositionModel, OnnxSequenceModel, ProphetModel, SequenceModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Loads each artifact kind from its fixed location
pub trait ArtifactLoader: Send + Sync {
    fn load_sequence_model(&self) -> Result<Arc<dyn SequenceModel>, LoadError>;
    fn load_decomposition_model(&self) -> Result<Arc<dyn DecompositionModel>, LoadError>;
    fn load_feature_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError>;
    fn load_target_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError>;
    fn load_dataset(&self) -> Result<Arc<HistoricalDataset>, LoadError>;
}

/// Artifact file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPaths {
    pub sequence_model: PathBuf,
    pub decomposition_model: PathBuf,
    pub feature_scaler: PathBuf,
    pub target_scaler: PathBuf,
    pub dataset: PathBuf,
    /// Pre-exported chart series, served as-is
    pub chart_data: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            sequence_model: PathBuf::from("model/lstm_model_rr.onnx"),
            decomposition_model: PathBuf::from("model/prophet_model_rr.json"),
            feature_scaler: PathBuf::from("scaler/scaler_features.json"),
            target_scaler: PathBuf::from("scaler/scaler_target.json"),
            dataset: PathBuf::from("data/data_bmkg_raw.csv"),
            chart_data: PathBuf::from("static/data/model_charts.json"),
        }
    }
}

/// Filesystem loader for the exported artifact formats
pub struct FsArtifactLoader {
    paths: ArtifactPaths,
}

impl FsArtifactLoader {
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}

fn read(slot: ArtifactSlot, path: &Path) -> Result<String, LoadError> {
    info!("Reading {} from {}", slot, path.display());
    fs::read_to_string(path).map_err(|e| LoadError::new(slot, format!("{}: {}", path.display(), e)))
}

fn load_scaler(slot: ArtifactSlot, path: &Path) -> Result<Arc<FeatureScaler>, LoadError> {
    let raw = read(slot, path)?;
    let scaler = FeatureScaler::from_json(&raw).map_err(|e| LoadError::new(slot, e))?;
    Ok(Arc::new(scaler))
}

impl ArtifactLoader for FsArtifactLoader {
    fn load_sequence_model(&self) -> Result<Arc<dyn SequenceModel>, LoadError> {
        let model = OnnxSequenceModel::load(&self.paths.sequence_model)
            .map_err(|e| LoadError::new(ArtifactSlot::SequenceModel, e))?;
        Ok(Arc::new(model))
    }

    fn load_decomposition_model(&self) -> Result<Arc<dyn DecompositionModel>, LoadError> {
        let slot = ArtifactSlot::DecompositionModel;
        let raw = read(slot, &self.paths.decomposition_model)?;
        let model = ProphetModel::from_json(&raw).map_err(|e| LoadError::new(slot, e))?;
        Ok(Arc::new(model))
    }

    fn load_feature_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError> {
        load_scaler(ArtifactSlot::FeatureScaler, &self.paths.feature_scaler)
    }

    fn load_target_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError> {
        load_scaler(ArtifactSlot::TargetScaler, &self.paths.target_scaler)
    }

    fn load_dataset(&self) -> Result<Arc<HistoricalDataset>, LoadError> {
        let dataset = HistoricalDataset::from_path(&self.paths.dataset)
            .map_err(|e| LoadError::new(ArtifactSlot::Dataset, e))?;
        Ok(Arc::new(dataset))
    }
}
