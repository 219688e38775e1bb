//! Artifact Cache
//!
//! Each slot is a `OnceCell`: concurrent first accesses block on a single initializer,
//! a successful load is kept for the life of the process, and a failed load leaves the
//! slot empty so the next access tries again.

use crate::dataset::HistoricalDataset;
use crate::loader::ArtifactLoader;
use crate::{ArtifactSlot, LoadError};
use feature_engine::FeatureScaler;
use inference_engine::{DecompositionModel, SequenceModel};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// A loaded artifact of any slot kind
#[derive(Clone)]
pub enum Artifact {
    SequenceModel(Arc<dyn SequenceModel>),
    DecompositionModel(Arc<dyn DecompositionModel>),
    FeatureScaler(Arc<FeatureScaler>),
    TargetScaler(Arc<FeatureScaler>),
    Dataset(Arc<HistoricalDataset>),
}

impl Artifact {
    pub fn slot(&self) -> ArtifactSlot {
        match self {
            Artifact::SequenceModel(_) => ArtifactSlot::SequenceModel,
            Artifact::DecompositionModel(_) => ArtifactSlot::DecompositionModel,
            Artifact::FeatureScaler(_) => ArtifactSlot::FeatureScaler,
            Artifact::TargetScaler(_) => ArtifactSlot::TargetScaler,
            Artifact::Dataset(_) => ArtifactSlot::Dataset,
        }
    }
}

/// Lazily loaded, never evicted artifacts shared by every request
pub struct ArtifactCache {
    loader: Arc<dyn ArtifactLoader>,
    sequence_model: OnceCell<Arc<dyn SequenceModel>>,
    decomposition_model: OnceCell<Arc<dyn DecompositionModel>>,
    feature_scaler: OnceCell<Arc<FeatureScaler>>,
    target_scaler: OnceCell<Arc<FeatureScaler>>,
    dataset: OnceCell<Arc<HistoricalDataset>>,
}

impl ArtifactCache {
    /// Create an empty cache; nothing is loaded until first access
    pub fn new(loader: Arc<dyn ArtifactLoader>) -> Self {
        info!("Creating artifact cache");
        Self {
            loader,
            sequence_model: OnceCell::new(),
            decomposition_model: OnceCell::new(),
            feature_scaler: OnceCell::new(),
            target_scaler: OnceCell::new(),
            dataset: OnceCell::new(),
        }
    }

    fn get_or_init<T: ?Sized>(
        &self,
        cell: &OnceCell<Arc<T>>,
        slot: ArtifactSlot,
        load: impl FnOnce(&dyn ArtifactLoader) -> Result<Arc<T>, LoadError>,
    ) -> Result<Arc<T>, LoadError> {
        if let Some(artifact) = cell.get() {
            return Ok(Arc::clone(artifact));
        }

        cell.get_or_try_init(|| {
            let start = Instant::now();
            match load(self.loader.as_ref()) {
                Ok(artifact) => {
                    info!("Loaded {} in {}ms", slot, start.elapsed().as_millis());
                    metrics::counter!("rainfall_artifact_loads_total", "slot" => slot.as_str(), "outcome" => "ok")
                        .increment(1);
                    Ok(artifact)
                }
                Err(e) => {
                    error!("Failed to load {}: {}", slot, e.cause);
                    metrics::counter!("rainfall_artifact_loads_total", "slot" => slot.as_str(), "outcome" => "error")
                        .increment(1);
                    Err(e)
                }
            }
        })
        .map(Arc::clone)
    }

    pub fn sequence_model(&self) -> Result<Arc<dyn SequenceModel>, LoadError> {
        self.get_or_init(&self.sequence_model, ArtifactSlot::SequenceModel, |l| {
            l.load_sequence_model()
        })
    }

    pub fn decomposition_model(&self) -> Result<Arc<dyn DecompositionModel>, LoadError> {
        self.get_or_init(&self.decomposition_model, ArtifactSlot::DecompositionModel, |l| {
            l.load_decomposition_model()
        })
    }

    pub fn feature_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError> {
        self.get_or_init(&self.feature_scaler, ArtifactSlot::FeatureScaler, |l| {
            l.load_feature_scaler()
        })
    }

    pub fn target_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError> {
        self.get_or_init(&self.target_scaler, ArtifactSlot::TargetScaler, |l| {
            l.load_target_scaler()
        })
    }

    pub fn dataset(&self) -> Result<Arc<HistoricalDataset>, LoadError> {
        self.get_or_init(&self.dataset, ArtifactSlot::Dataset, |l| l.load_dataset())
    }

    /// Slot-polymorphic accessor
    pub fn get_or_load(&self, slot: ArtifactSlot) -> Result<Artifact, LoadError> {
        Ok(match slot {
            ArtifactSlot::SequenceModel => Artifact::SequenceModel(self.sequence_model()?),
            ArtifactSlot::DecompositionModel => Artifact::DecompositionModel(self.decomposition_model()?),
            ArtifactSlot::FeatureScaler => Artifact::FeatureScaler(self.feature_scaler()?),
            ArtifactSlot::TargetScaler => Artifact::TargetScaler(self.target_scaler()?),
            ArtifactSlot::Dataset => Artifact::Dataset(self.dataset()?),
        })
    }

    /// Whether a slot holds a loaded artifact
    pub fn is_loaded(&self, slot: ArtifactSlot) -> bool {
        match slot {
            ArtifactSlot::SequenceModel => self.sequence_model.get().is_some(),
            ArtifactSlot::DecompositionModel => self.decomposition_model.get().is_some(),
            ArtifactSlot::FeatureScaler => self.feature_scaler.get().is_some(),
            ArtifactSlot::TargetScaler => self.target_scaler.get().is_some(),
            ArtifactSlot::Dataset => self.dataset.get().is_some(),
        }
    }

    /// Load state of every slot
    pub fn status(&self) -> Vec<(ArtifactSlot, bool)> {
        ArtifactSlot::ALL
            .iter()
            .map(|slot| (*slot, self.is_loaded(*slot)))
            .collect()
    }

    /// Whether both models and their scalers are loaded
    pub fn models_loaded(&self) -> bool {
        ArtifactSlot::ALL
            .iter()
            .filter(|slot| **slot != ArtifactSlot::Dataset)
            .all(|slot| self.is_loaded(*slot))
    }

    /// Load every model slot, returning the failures
    pub fn warm(&self) -> Vec<LoadError> {
        let errors: Vec<LoadError> = ArtifactSlot::ALL
            .iter()
            .filter(|slot| **slot != ArtifactSlot::Dataset)
            .filter_map(|slot| self.get_or_load(*slot).err())
            .collect();
        debug!("Cache warm-up finished with {} failures", errors.len());
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{FutureFrame, SequenceWindow};
    use inference_engine::{DecompositionForecast, InferenceError};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct ConstSequence;

    impl SequenceModel for ConstSequence {
        fn forward(&self, _window: &SequenceWindow) -> Result<f64, InferenceError> {
            Ok(0.5)
        }
    }

    struct ConstDecomposition;

    impl DecompositionModel for ConstDecomposition {
        fn forecast(&self, _frame: &FutureFrame) -> Result<DecompositionForecast, InferenceError> {
            Ok(DecompositionForecast {
                yhat: 1.0,
                trend: 1.0,
                additive: 0.0,
                multiplicative: 0.0,
            })
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        sequence_loads: AtomicUsize,
        scaler_loads: AtomicUsize,
        fail_decomposition: AtomicBool,
        decomposition_attempts: AtomicUsize,
    }

    impl ArtifactLoader for CountingLoader {
        fn load_sequence_model(&self) -> Result<Arc<dyn SequenceModel>, LoadError> {
            self.sequence_loads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(Arc::new(ConstSequence))
        }

        fn load_decomposition_model(&self) -> Result<Arc<dyn DecompositionModel>, LoadError> {
            self.decomposition_attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_decomposition.load(Ordering::SeqCst) {
                return Err(LoadError::new(ArtifactSlot::DecompositionModel, "corrupt"));
            }
            Ok(Arc::new(ConstDecomposition))
        }

        fn load_feature_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError> {
            self.scaler_loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FeatureScaler::Standard {
                mean: vec![0.0, 0.0],
                scale: vec![1.0, 1.0],
            }))
        }

        fn load_target_scaler(&self) -> Result<Arc<FeatureScaler>, LoadError> {
            self.scaler_loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FeatureScaler::Standard {
                mean: vec![0.0],
                scale: vec![1.0],
            }))
        }

        fn load_dataset(&self) -> Result<Arc<HistoricalDataset>, LoadError> {
            let dataset = HistoricalDataset::from_reader("date,TAVG,RH_AVG,RR\n2020-01-01,25,80,3\n".as_bytes())
                .map_err(|e| LoadError::new(ArtifactSlot::Dataset, e))?;
            Ok(Arc::new(dataset))
        }
    }

    #[test]
    fn test_repeated_access_loads_once() {
        let loader = Arc::new(CountingLoader::default());
        let cache = ArtifactCache::new(loader.clone());

        assert!(!cache.is_loaded(ArtifactSlot::SequenceModel));
        for _ in 0..5 {
            cache.sequence_model().unwrap();
            cache.feature_scaler().unwrap();
        }
        assert_eq!(loader.sequence_loads.load(Ordering::SeqCst), 1);
        assert_eq!(loader.scaler_loads.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded(ArtifactSlot::SequenceModel));
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let loader = Arc::new(CountingLoader::default());
        let cache = Arc::new(ArtifactCache::new(loader.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.sequence_model().map(|_| ()))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(loader.sequence_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let loader = Arc::new(CountingLoader::default());
        loader.fail_decomposition.store(true, Ordering::SeqCst);
        let cache = ArtifactCache::new(loader.clone());

        let err = cache.decomposition_model().err().unwrap();
        assert_eq!(err.slot, ArtifactSlot::DecompositionModel);
        assert!(cache.decomposition_model().is_err());
        assert!(!cache.is_loaded(ArtifactSlot::DecompositionModel));
        assert_eq!(loader.decomposition_attempts.load(Ordering::SeqCst), 2);

        loader.fail_decomposition.store(false, Ordering::SeqCst);
        assert!(cache.decomposition_model().is_ok());
        assert!(cache.decomposition_model().is_ok());
        assert_eq!(loader.decomposition_attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_warm_reports_failures() {
        let loader = Arc::new(CountingLoader::default());
        loader.fail_decomposition.store(true, Ordering::SeqCst);
        let cache = ArtifactCache::new(loader);

        let errors = cache.warm();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].slot, ArtifactSlot::DecompositionModel);
        assert!(!cache.models_loaded());
        assert!(!cache.is_loaded(ArtifactSlot::Dataset));
    }

    #[test]
    fn test_get_or_load_by_slot() {
        let cache = ArtifactCache::new(Arc::new(CountingLoader::default()));
        for slot in ArtifactSlot::ALL {
            assert_eq!(cache.get_or_load(slot).ok().map(|a| a.slot()), Some(slot));
        }
        assert!(cache.status().iter().all(|(_, loaded)| *loaded));
    }
}
