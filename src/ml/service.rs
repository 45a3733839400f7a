use crate::config::TrainingConfig;
use crate::error::Result;
use crate::ml::dataset::{train_test_split, DatasetSource};
use crate::ml::models::EvaluationMetrics;
use crate::ml::regression::RegressionPipeline;
use crate::ml::schema::SALARY_SCHEMA;
use crate::state::ArtifactStore;
use smartcore::metrics;
use std::sync::Arc;

/// Coefficient of determination.
///
/// A constant target has no variance to explain: the score is 1.0 for an exact
/// fit and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }

    let first = y_true[0];
    if y_true.iter().all(|t| *t == first) {
        return if y_true == y_pred { 1.0 } else { 0.0 };
    }
    metrics::r2(&y_true.to_vec(), &y_pred.to_vec())
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }
    metrics::mean_absolute_error(&y_true.to_vec(), &y_pred.to_vec())
}

/// Fits, evaluates and persists pipelines.
///
/// Retraining never touches the live registry; callers reload it explicitly.
pub struct TrainingService {
    store: Arc<dyn ArtifactStore>,
    config: TrainingConfig,
}

impl TrainingService {
    pub fn new(store: Arc<dyn ArtifactStore>, config: TrainingConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Retrain from the configured dataset path
    pub fn retrain_default(&self) -> Result<EvaluationMetrics> {
        self.retrain(&DatasetSource::CsvFile(self.config.dataset_path.clone()))
    }

    pub fn retrain(&self, source: &DatasetSource) -> Result<EvaluationMetrics> {
        self.config.validate()?;

        tracing::info!(
            test_size = self.config.test_size,
            seed = self.config.random_seed,
            "Starting retrain"
        );

        let dataset = source.load(&SALARY_SCHEMA, &self.config.target_column)?;
        let (train, test) =
            train_test_split(&dataset, self.config.test_size, self.config.random_seed)?;

        tracing::debug!(
            n_rows = dataset.len(),
            n_train = train.len(),
            n_test = test.len(),
            "Split dataset"
        );

        let pipeline = RegressionPipeline::fit(train.records(), train.targets())?;
        let predictions = pipeline.predict(test.records()).to_vec();

        let metrics = EvaluationMetrics {
            r2: r2_score(test.targets(), &predictions),
            mae: mean_absolute_error(test.targets(), &predictions),
            n_test: test.len(),
        };

        self.store.save_pipeline(&pipeline)?;
        tracing::info!(location = %self.store.describe(), "Model artifact written");
        self.store.save_metrics(&metrics)?;

        tracing::info!(
            r2 = metrics.r2,
            mae = metrics.mae,
            n_test = metrics.n_test,
            "Retrain finished"
        );

        Ok(metrics)
    }

    /// Metrics of the most recent persisted retrain
    pub fn latest_metrics(&self) -> Result<Option<EvaluationMetrics>> {
        self.store.load_metrics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::ml::dataset::LabeledDataset;
    use crate::ml::models::FeatureRecord;
    use crate::state::{FsArtifactStore, InMemoryArtifactStore};
    use tempfile::TempDir;

    const CITIES: [&str; 3] = ["Pune", "Mumbai", "Bengaluru"];

    fn synthetic_dataset(n: usize) -> LabeledDataset {
        let mut records = Vec::with_capacity(n);
        let mut targets = Vec::with_capacity(n);

        for i in 0..n {
            let years = (i % 20) as f64;
            let city = CITIES[i % CITIES.len()];
            let python = (i % 2) as u8;

            records.push(
                FeatureRecord::new()
                    .with_numeric("years_experience", years)
                    .with_category("city", city)
                    .with_flag("skills_python", python),
            );
            targets.push(
                300_000.0
                    + 80_000.0 * years
                    + 150_000.0 * (i % CITIES.len()) as f64
                    + 60_000.0 * f64::from(python),
            );
        }

        LabeledDataset::new(records, targets).unwrap()
    }

    fn service(store: &InMemoryArtifactStore) -> TrainingService {
        TrainingService::new(Arc::new(store.clone()), TrainingConfig::default())
    }

    #[test]
    fn test_r2_score() {
        assert_eq!(r2_score(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 1.0);
        assert!((r2_score(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0])).abs() < 1e-12);
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn test_mean_absolute_error() {
        assert_eq!(mean_absolute_error(&[1.0, 2.0, 3.0], &[2.0, 2.0, 5.0]), 1.0);
        assert_eq!(mean_absolute_error(&[], &[]), 0.0);
    }

    #[test]
    fn test_retrain_persists_pipeline_and_metrics() {
        let store = InMemoryArtifactStore::new();
        let metrics = service(&store)
            .retrain(&DatasetSource::Records(synthetic_dataset(100)))
            .unwrap();

        assert_eq!(metrics.n_test, 20);
        assert!(metrics.r2 > 0.999);
        assert!(metrics.mae < 1.0);

        assert!(store.load_pipeline().unwrap().unwrap().is_trained());
        assert_eq!(store.load_metrics().unwrap(), Some(metrics));
    }

    #[test]
    fn test_retrain_is_reproducible() {
        let dataset = DatasetSource::Records(synthetic_dataset(60));
        let a = service(&InMemoryArtifactStore::new()).retrain(&dataset).unwrap();
        let b = service(&InMemoryArtifactStore::new()).retrain(&dataset).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_retrain_rejects_invalid_test_size() {
        let store = InMemoryArtifactStore::new();
        let config = TrainingConfig {
            test_size: 1.5,
            ..TrainingConfig::default()
        };
        let service = TrainingService::new(Arc::new(store.clone()), config);

        let err = service
            .retrain(&DatasetSource::Records(synthetic_dataset(10)))
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(store.load_pipeline().unwrap().is_none());
    }

    #[test]
    fn test_failed_retrain_leaves_store_untouched() {
        let store = InMemoryArtifactStore::new();
        let service = service(&store);

        let missing = DatasetSource::CsvFile("/nonexistent/salary.csv".into());
        assert!(matches!(service.retrain(&missing), Err(AppError::Dataset(_))));
        assert!(store.load_pipeline().unwrap().is_none());
        assert!(service.latest_metrics().unwrap().is_none());
    }

    #[test]
    fn test_storage_failure_propagates() {
        let dir = TempDir::new().unwrap();
        // A directory where the artifact file should go cannot be replaced
        let artifact_path = dir.path().join("model.bin");
        std::fs::create_dir(&artifact_path).unwrap();
        let metrics_path = dir.path().join("metrics.json");

        let store = FsArtifactStore::new(artifact_path, metrics_path.clone());
        let service = TrainingService::new(Arc::new(store.clone()), TrainingConfig::default());

        let result = service.retrain(&DatasetSource::Records(synthetic_dataset(50)));
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert!(!metrics_path.exists());
        assert!(store.load_metrics().unwrap().is_none());
    }
}
