use crate::error::{AppError, Result};
use crate::ml::{EvaluationMetrics, RegressionPipeline};
use crate::state::ArtifactStore;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Artifact store backed by two files: a bincode pipeline and JSON metrics
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    artifact_path: PathBuf,
    metrics_path: PathBuf,
}

impl FsArtifactStore {
    pub fn new(artifact_path: impl Into<PathBuf>, metrics_path: impl Into<PathBuf>) -> Self {
        Self {
            artifact_path: artifact_path.into(),
            metrics_path: metrics_path.into(),
        }
    }

    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub fn metrics_path(&self) -> &Path {
        &self.metrics_path
    }

    /// Read a file, mapping "not found" to `None`
    fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Write through a sibling temp file and rename, so readers never see a
    /// partially written artifact
    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, bytes).map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, path).map_err(|e| {
            AppError::Storage(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

impl ArtifactStore for FsArtifactStore {
    fn load_pipeline(&self) -> Result<Option<RegressionPipeline>> {
        match Self::read_optional(&self.artifact_path)? {
            Some(bytes) => RegressionPipeline::from_bytes(&bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save_pipeline(&self, pipeline: &RegressionPipeline) -> Result<()> {
        let bytes = pipeline.to_bytes()?;
        Self::write_atomic(&self.artifact_path, &bytes)?;
        tracing::debug!(path = ?self.artifact_path, bytes = bytes.len(), "Pipeline artifact written");
        Ok(())
    }

    fn save_metrics(&self, metrics: &EvaluationMetrics) -> Result<()> {
        let json = serde_json::to_vec_pretty(metrics)?;
        Self::write_atomic(&self.metrics_path, &json)
    }

    fn load_metrics(&self) -> Result<Option<EvaluationMetrics>> {
        match Self::read_optional(&self.metrics_path)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        self.artifact_path.display().to_string()
    }
}
