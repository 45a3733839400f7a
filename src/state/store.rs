use crate::error::Result;
use crate::ml::{EvaluationMetrics, RegressionPipeline};
use crate::state::ArtifactStore;
use parking_lot::RwLock;
use std::sync::Arc;

/// In-memory artifact store (for testing and development).
///
/// Pipelines are kept in their serialized form so a load goes through the
/// same decoding path as the filesystem store.
#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    pipeline: Arc<RwLock<Option<Vec<u8>>>>,
    metrics: Arc<RwLock<Option<EvaluationMetrics>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes as the pipeline artifact
    pub fn put_raw_artifact(&self, bytes: Vec<u8>) {
        *self.pipeline.write() = Some(bytes);
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn load_pipeline(&self) -> Result<Option<RegressionPipeline>> {
        match self.pipeline.read().as_deref() {
            Some(bytes) => RegressionPipeline::from_bytes(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save_pipeline(&self, pipeline: &RegressionPipeline) -> Result<()> {
        let bytes = pipeline.to_bytes()?;
        *self.pipeline.write() = Some(bytes);
        tracing::debug!("Pipeline saved to memory");
        Ok(())
    }

    fn save_metrics(&self, metrics: &EvaluationMetrics) -> Result<()> {
        *self.metrics.write() = Some(*metrics);
        Ok(())
    }

    fn load_metrics(&self) -> Result<Option<EvaluationMetrics>> {
        Ok(*self.metrics.read())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
