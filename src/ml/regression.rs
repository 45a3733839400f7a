use crate::error::{AppError, Result};
use crate::ml::features::TransformerState;
use crate::ml::models::{FeatureRecord, PipelineMetadata};
use crate::ml::schema::{FeatureSchema, SALARY_SCHEMA};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};

/// Fitted linear model: `y = x · weights + intercept`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCoefficients {
    pub weights: Array1<f64>,
    pub intercept: f64,
}

impl ModelCoefficients {
    pub fn zeros(n_features: usize) -> Self {
        Self {
            weights: Array1::zeros(n_features),
            intercept: 0.0,
        }
    }

    pub fn apply(&self, features: &Array2<f64>) -> Array1<f64> {
        features.dot(&self.weights) + self.intercept
    }

    /// Ordinary least squares with intercept.
    ///
    /// Solved by SVD, so the one-hot design (every category column plus the
    /// intercept) yields the minimum-norm solution instead of failing.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        let (n_samples, n_features) = x.dim();
        if n_samples == 0 || n_samples != y.len() {
            return Err(AppError::Training(format!(
                "Cannot fit {} feature rows against {} targets",
                n_samples,
                y.len()
            )));
        }

        let x_dense = ndarray_to_densematrix(x);
        let y_vec: Vec<f64> = y.to_vec();

        let params =
            LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD);
        let model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>> =
            LinearRegression::fit(&x_dense, &y_vec, params).map_err(|e| {
                AppError::Training(format!("Failed to fit linear regression: {}", e))
            })?;

        let weights = Array1::from_shape_fn(n_features, |i| *model.coefficients().get((i, 0)));
        let intercept = *model.intercept();

        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(AppError::Training(
                "Least-squares solution is not finite".to_string(),
            ));
        }

        Ok(Self { weights, intercept })
    }
}

fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let (nrows, ncols) = arr.dim();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(nrows, ncols, data, false)
}

/// Lifecycle state of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PipelineStatus {
    /// No statistics, vocabulary or coefficients learned
    Untrained,
    Trained(PipelineMetadata),
}

/// Feature transformer and linear model, fitted together.
///
/// The only way to obtain trained coefficients is [`RegressionPipeline::fit`],
/// which learns the transformer state from the same rows, so serving always
/// encodes features exactly as training did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionPipeline {
    transformer: TransformerState,
    coefficients: ModelCoefficients,
    status: PipelineStatus,
}

impl Default for RegressionPipeline {
    fn default() -> Self {
        Self::untrained(&SALARY_SCHEMA)
    }
}

impl RegressionPipeline {
    /// Untrained pipeline. Predicts 0.0 for every record.
    pub fn untrained(schema: &FeatureSchema) -> Self {
        let transformer = TransformerState::unfitted(schema);
        let coefficients = ModelCoefficients::zeros(transformer.n_features());

        Self {
            transformer,
            coefficients,
            status: PipelineStatus::Untrained,
        }
    }

    /// Fit on the salary schema
    pub fn fit(records: &[FeatureRecord], targets: &[f64]) -> Result<Self> {
        Self::fit_with_schema(&SALARY_SCHEMA, records, targets)
    }

    /// Fit transformer statistics and coefficients on the same rows
    pub fn fit_with_schema(
        schema: &FeatureSchema,
        records: &[FeatureRecord],
        targets: &[f64],
    ) -> Result<Self> {
        if records.is_empty() {
            return Err(AppError::Training("No training records".to_string()));
        }

        if records.len() != targets.len() {
            return Err(AppError::Training(format!(
                "{} records but {} targets",
                records.len(),
                targets.len()
            )));
        }

        if targets.iter().any(|t| !t.is_finite()) {
            return Err(AppError::Training("Targets must be finite".to_string()));
        }

        let transformer = TransformerState::fit(schema, records);
        let x = transformer.transform(records);
        let y = Array1::from_vec(targets.to_vec());

        let coefficients = ModelCoefficients::fit(&x, &y)?;

        tracing::debug!(
            n_samples = records.len(),
            n_features = transformer.n_features(),
            intercept = coefficients.intercept,
            "Fitted regression pipeline"
        );

        let metadata = PipelineMetadata {
            trained_at: chrono::Utc::now(),
            n_training_samples: records.len(),
            n_features: transformer.n_features(),
        };

        Ok(Self {
            transformer,
            coefficients,
            status: PipelineStatus::Trained(metadata),
        })
    }

    /// Predict one value per record
    pub fn predict(&self, records: &[FeatureRecord]) -> Array1<f64> {
        let features = self.transformer.transform(records);
        self.coefficients.apply(&features)
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.status, PipelineStatus::Trained(_))
    }

    pub fn status(&self) -> &PipelineStatus {
        &self.status
    }

    pub fn metadata(&self) -> Option<&PipelineMetadata> {
        match &self.status {
            PipelineStatus::Trained(metadata) => Some(metadata),
            PipelineStatus::Untrained => None,
        }
    }

    pub fn transformer(&self) -> &TransformerState {
        &self.transformer
    }

    pub fn coefficients(&self) -> &ModelCoefficients {
        &self.coefficients
    }

    /// Encode as an artifact blob
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode an artifact blob, rejecting inconsistent layouts
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let pipeline: Self = bincode::deserialize(bytes)
            .map_err(|e| AppError::Storage(format!("Corrupt model artifact: {}", e)))?;

        let expected = pipeline.transformer.n_features();
        let actual = pipeline.coefficients.weights.len();
        if expected != actual {
            return Err(AppError::Storage(format!(
                "Model artifact has {} coefficients for {} encoded features",
                actual, expected
            )));
        }

        Ok(pipeline)
    }
}
