use crate::error::{AppError, Result};
use config::builder::{ConfigBuilder, DefaultState};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model artifact configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Training configuration
    #[serde(default)]
    pub training: TrainingConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("SALARY_CONFIG_PATH")
            .unwrap_or_else(|_| "config/default.toml".to_string());

        let builder = config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: SALARY_)
            .add_source(
                config::Environment::with_prefix("SALARY")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        Ok(builder.build()?.try_deserialize()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactBackend {
    Filesystem,
    InMemory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Serialized pipeline location
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Metrics record location
    #[serde(default = "default_metrics_path")]
    pub metrics_path: PathBuf,

    /// Version string reported by the API
    #[serde(default = "default_model_version")]
    pub version: String,

    #[serde(default = "default_backend")]
    pub backend: ArtifactBackend,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            metrics_path: default_metrics_path(),
            version: default_model_version(),
            backend: default_backend(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Labeled CSV used by default retrains
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,

    /// Seed of the train/test shuffle
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    #[serde(default = "default_target_column")]
    pub target_column: String,
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(AppError::Configuration(format!(
                "training.test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.target_column.is_empty() {
            return Err(AppError::Configuration(
                "training.target_column must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            test_size: default_test_size(),
            random_seed: default_random_seed(),
            target_column: default_target_column(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from("artifacts/model.bin")
}

fn default_metrics_path() -> PathBuf {
    PathBuf::from("artifacts/metrics.json")
}

fn default_model_version() -> String {
    "1.0.0".to_string()
}

fn default_backend() -> ArtifactBackend {
    ArtifactBackend::Filesystem
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/salary_data.csv")
}

fn default_test_size() -> f64 {
    0.2
}

fn default_random_seed() -> u64 {
    42
}

fn default_target_column() -> String {
    crate::ml::schema::TARGET_COLUMN.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
