pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::ml::{ModelRegistry, TrainingService};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub trainer: Arc<TrainingService>,
    pub model_version: String,
}

impl AppState {
    pub fn new(
        registry: Arc<ModelRegistry>,
        trainer: Arc<TrainingService>,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            trainer,
            model_version: model_version.into(),
        }
    }
}
