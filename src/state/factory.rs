use crate::config::{ArtifactBackend, ModelConfig};
use crate::state::{ArtifactStore, FsArtifactStore, InMemoryArtifactStore};
use std::sync::Arc;

/// Create an artifact store based on configuration
pub fn create_artifact_store(config: &ModelConfig) -> Arc<dyn ArtifactStore> {
    match config.backend {
        ArtifactBackend::Filesystem => {
            tracing::info!(path = ?config.artifact_path, "Initializing filesystem artifact backend");
            Arc::new(FsArtifactStore::new(
                config.artifact_path.clone(),
                config.metrics_path.clone(),
            ))
        }
        ArtifactBackend::InMemory => create_in_memory_store(),
    }
}

/// Create an in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn ArtifactStore> {
    tracing::info!("Initializing in-memory artifact backend");
    Arc::new(InMemoryArtifactStore::new())
}
