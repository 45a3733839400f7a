use crate::ml::models::CleanRecord;
use crate::ml::regression::RegressionPipeline;
use crate::state::ArtifactStore;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where the active pipeline came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Decoded from a persisted artifact
    Artifact,
    /// Untrained pipeline constructed because no usable artifact existed
    Fallback,
}

/// Loaded pipeline as served to callers
#[derive(Debug)]
pub struct SalaryModel {
    pipeline: RegressionPipeline,
    source: ModelSource,
}

impl SalaryModel {
    pub fn new(pipeline: RegressionPipeline, source: ModelSource) -> Self {
        Self { pipeline, source }
    }

    pub fn pipeline(&self) -> &RegressionPipeline {
        &self.pipeline
    }

    pub fn source(&self) -> ModelSource {
        self.source
    }

    /// Predict a single validated record
    pub fn predict_one(&self, record: &CleanRecord) -> f64 {
        let rows = std::slice::from_ref(record.features());
        self.pipeline.predict(rows)[0]
    }

    pub fn predict_batch(&self, records: &[CleanRecord]) -> Vec<f64> {
        let rows: Vec<_> = records.iter().map(|r| r.features().clone()).collect();
        self.pipeline.predict(&rows).to_vec()
    }
}

/// Holds at most one active pipeline per process.
///
/// Readers take the slot's read lock only long enough to clone the `Arc`, so a
/// forced reload never blocks an in-flight prediction and never exposes a
/// half-assigned pipeline.
pub struct ModelRegistry {
    store: Arc<dyn ArtifactStore>,
    slot: RwLock<Option<Arc<SalaryModel>>>,
    load_lock: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            slot: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Active model, loading it first if the slot is empty
    pub fn get(&self) -> Arc<SalaryModel> {
        if let Some(model) = self.slot.read().as_ref() {
            return Arc::clone(model);
        }
        self.load(false)
    }

    /// Load the persisted artifact into the slot.
    ///
    /// Without `force` an already-loaded slot is returned unchanged. A missing
    /// or unreadable artifact installs an untrained fallback pipeline.
    pub fn load(&self, force: bool) -> Arc<SalaryModel> {
        let _guard = self.load_lock.lock();

        if !force {
            if let Some(model) = self.slot.read().as_ref() {
                return Arc::clone(model);
            }
        }

        let model = Arc::new(self.read_artifact());
        *self.slot.write() = Some(Arc::clone(&model));
        model
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    fn read_artifact(&self) -> SalaryModel {
        match self.store.load_pipeline() {
            Ok(Some(pipeline)) => {
                match pipeline.metadata() {
                    Some(metadata) => tracing::info!(
                        location = %self.store.describe(),
                        n_features = metadata.n_features,
                        trained_at = %metadata.trained_at,
                        "Loaded model artifact"
                    ),
                    None => tracing::info!(
                        location = %self.store.describe(),
                        "Loaded untrained model artifact"
                    ),
                }
                SalaryModel::new(pipeline, ModelSource::Artifact)
            }
            Ok(None) => {
                tracing::warn!(
                    location = %self.store.describe(),
                    "No model artifact found, serving untrained fallback pipeline"
                );
                SalaryModel::new(RegressionPipeline::default(), ModelSource::Fallback)
            }
            Err(e) => {
                tracing::warn!(
                    location = %self.store.describe(),
                    error = %e,
                    "Model artifact unusable, serving untrained fallback pipeline"
                );
                SalaryModel::new(RegressionPipeline::default(), ModelSource::Fallback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::models::{FeatureRecord, RawRecord};
    use crate::ml::validation::validate;
    use crate::state::InMemoryArtifactStore;

    fn clean_record(years: i64) -> CleanRecord {
        validate(
            &RawRecord::new()
                .with("years_experience", years)
                .with("education_level", "Master")
                .with("job_title", "Data Scientist")
                .with("city", "Bengaluru")
                .with("company_size", "Large")
                .with("skills_python", 1i64)
                .with("skills_java", 0i64)
                .with("skills_aws", 1i64)
                .with("skills_sql", 1i64),
        )
        .unwrap()
    }

    fn trained_pipeline(slope: f64) -> RegressionPipeline {
        let records: Vec<_> = (0..10)
            .map(|i| FeatureRecord::new().with_numeric("years_experience", i as f64))
            .collect();
        let targets: Vec<_> = (0..10).map(|i| 100_000.0 + slope * i as f64).collect();
        RegressionPipeline::fit(&records, &targets).unwrap()
    }

    fn registry_with(store: &InMemoryArtifactStore) -> ModelRegistry {
        ModelRegistry::new(Arc::new(store.clone()))
    }

    #[test]
    fn test_fallback_when_artifact_missing() {
        let registry = registry_with(&InMemoryArtifactStore::new());
        assert!(!registry.is_loaded());

        let model = registry.get();
        assert!(registry.is_loaded());
        assert_eq!(model.source(), ModelSource::Fallback);
        assert!(!model.pipeline().is_trained());

        let prediction = model.predict_one(&clean_record(4));
        assert!(prediction.is_finite());
    }

    #[test]
    fn test_fallback_when_artifact_corrupt() {
        let store = InMemoryArtifactStore::new();
        store.put_raw_artifact(b"garbage".to_vec());

        let model = registry_with(&store).get();
        assert_eq!(model.source(), ModelSource::Fallback);
    }

    #[test]
    fn test_load_is_idempotent() {
        let store = InMemoryArtifactStore::new();
        store.save_pipeline(&trained_pipeline(50_000.0)).unwrap();
        let registry = registry_with(&store);

        let first = registry.load(false);
        let second = registry.load(false);
        let third = registry.get();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(first.source(), ModelSource::Artifact);
    }

    #[test]
    fn test_forced_reload_picks_up_new_artifact() {
        let store = InMemoryArtifactStore::new();
        let registry = registry_with(&store);
        let record = clean_record(5);

        let before = registry.get();
        assert_eq!(before.predict_one(&record), 0.0);

        store.save_pipeline(&trained_pipeline(50_000.0)).unwrap();
        // Without force the cached fallback stays active
        assert!(Arc::ptr_eq(&before, &registry.load(false)));

        let after = registry.load(true);
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(Arc::ptr_eq(&after, &registry.get()));
        assert!((after.predict_one(&record) - 350_000.0).abs() < 1e-3);

        // Holders of the old model are unaffected
        assert_eq!(before.predict_one(&record), 0.0);
    }

    #[test]
    fn test_predict_batch_matches_single() {
        let store = InMemoryArtifactStore::new();
        store.save_pipeline(&trained_pipeline(10_000.0)).unwrap();
        let model = registry_with(&store).get();

        let records = vec![clean_record(1), clean_record(2), clean_record(3)];
        let batch = model.predict_batch(&records);

        assert_eq!(batch.len(), 3);
        for (record, value) in records.iter().zip(&batch) {
            assert!((model.predict_one(record) - value).abs() < 1e-6);
        }
    }

    #[test]
    fn test_concurrent_get_and_reload() {
        let store = InMemoryArtifactStore::new();
        store.save_pipeline(&trained_pipeline(20_000.0)).unwrap();
        let registry = registry_with(&store);
        let record = clean_record(3);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        let value = registry.get().predict_one(&record);
                        assert!((value - 160_000.0).abs() < 1e-3);
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..10 {
                    registry.load(true);
                }
            });
        });

        assert!(registry.is_loaded());
        assert_eq!(registry.get().source(), ModelSource::Artifact);
    }

    #[test]
    fn test_model_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(ModelSource::Fallback).unwrap(),
            serde_json::json!("fallback")
        );
    }
}
