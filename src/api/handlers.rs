use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::ml::{validate, EvaluationMetrics, ModelSource, RawRecord};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub model_source: Option<ModelSource>,
    pub version: String,
}

/// Health check endpoint. Never triggers a model load.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_source = state
        .registry
        .is_loaded()
        .then(|| state.registry.get().source());

    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: model_source.is_some(),
        model_source,
        version: state.model_version.clone(),
    })
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predicted_salary_inr: i64,
    pub currency: String,
    pub model_version: String,
}

/// Predict a salary for one record.
///
/// An unparsable body is treated as an empty record, so the caller gets the
/// full list of missing fields.
pub async fn predict(
    State(state): State<AppState>,
    body: std::result::Result<Json<RawRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>> {
    let raw = match body {
        Ok(Json(raw)) => raw,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unparsable prediction body");
            RawRecord::new()
        }
    };

    let clean = validate(&raw)?;
    let model = state.registry.get();
    let estimate = model.predict_one(&clean);

    tracing::debug!(
        estimate,
        source = ?model.source(),
        "Prediction served"
    );

    Ok(Json(PredictResponse {
        // Truncates toward zero
        predicted_salary_inr: estimate as i64,
        currency: "INR".to_string(),
        model_version: state.model_version.clone(),
    }))
}

/// Retrain from the configured dataset, then hot-reload the registry
pub async fn train(State(state): State<AppState>) -> Result<Json<EvaluationMetrics>> {
    let trainer = state.trainer.clone();
    let metrics = tokio::task::spawn_blocking(move || trainer.retrain_default())
        .await
        .map_err(|e| AppError::Internal(format!("Training task failed: {}", e)))??;

    let registry = state.registry.clone();
    tokio::task::spawn_blocking(move || registry.load(true))
        .await
        .map_err(|e| AppError::Internal(format!("Model reload failed: {}", e)))?;

    Ok(Json(metrics))
}
