pub mod factory;
pub mod fs_store;
pub mod store;

pub use factory::{create_artifact_store, create_in_memory_store};
pub use fs_store::FsArtifactStore;
pub use store::InMemoryArtifactStore;

use crate::error::Result;
use crate::ml::{EvaluationMetrics, RegressionPipeline};

/// Trait for model artifact storage operations
pub trait ArtifactStore: Send + Sync {
    /// Load the persisted pipeline, `None` when nothing has been saved yet
    fn load_pipeline(&self) -> Result<Option<RegressionPipeline>>;

    /// Persist a pipeline, replacing any previous one
    fn save_pipeline(&self, pipeline: &RegressionPipeline) -> Result<()>;

    /// Persist the metrics of the latest training run
    fn save_metrics(&self, metrics: &EvaluationMetrics) -> Result<()>;

    /// Load the metrics of the latest training run
    fn load_metrics(&self) -> Result<Option<EvaluationMetrics>>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;
}
