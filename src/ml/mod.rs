//! Salary prediction pipeline
//!
//! - Feature schema and request validation
//! - Feature encoding (standardisation, one-hot indicators, binary flags)
//! - Linear regression fitting and artifact serialization
//! - Model registry with fallback and hot reload
//! - Retraining and evaluation

pub mod dataset;
pub mod features;
pub mod models;
pub mod registry;
pub mod regression;
pub mod schema;
pub mod service;
pub mod validation;

pub use dataset::{train_test_split, DatasetSource, LabeledDataset};
pub use features::{CategoryEncoding, ScalerStats, TransformerState};
pub use models::{
    CleanRecord, EvaluationMetrics, FeatureRecord, FeatureValue, FieldValue, PipelineMetadata,
    RawRecord,
};
pub use registry::{ModelRegistry, ModelSource, SalaryModel};
pub use regression::{ModelCoefficients, PipelineStatus, RegressionPipeline};
pub use schema::{FeatureSchema, SALARY_SCHEMA, TARGET_COLUMN};
pub use service::{mean_absolute_error, r2_score, TrainingService};
pub use validation::{validate, ValidationErrors};
