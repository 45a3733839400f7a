/// HTTP surface tests, driven through the router without a socket

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{valid_json_body, write_dataset};
use salary_predictor::{
    api::{build_router, AppState},
    config::TrainingConfig,
    ml::{ModelRegistry, TrainingService},
    state::FsArtifactStore,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn build_test_app(dir: &TempDir) -> Router {
    let store = Arc::new(FsArtifactStore::new(
        dir.path().join("model.bin"),
        dir.path().join("metrics.json"),
    ));
    let registry = Arc::new(ModelRegistry::new(store.clone()));
    let config = TrainingConfig {
        dataset_path: dir.path().join("salary_data.csv"),
        ..TrainingConfig::default()
    };
    let trainer = Arc::new(TrainingService::new(store, config));

    build_router(AppState::new(registry, trainer, "1.0.0"))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_before_first_prediction() {
    let dir = TempDir::new().unwrap();
    let app = build_test_app(&dir);

    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model_loaded"], false);
    assert_eq!(body["model_source"], Value::Null);
    assert_eq!(body["version"], "1.0.0");
}

#[tokio::test]
async fn test_predict_with_fallback_model() {
    let dir = TempDir::new().unwrap();
    let app = build_test_app(&dir);

    let (status, body) = send(&app, post_json("/api/predict", valid_json_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_salary_inr"], 0);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["model_version"], "1.0.0");

    let (_, health) = send(&app, get("/api/health")).await;
    assert_eq!(health["model_loaded"], true);
    assert_eq!(health["model_source"], "fallback");
}

#[tokio::test]
async fn test_predict_rejects_invalid_record() {
    let dir = TempDir::new().unwrap();
    let app = build_test_app(&dir);

    let mut record: Value = serde_json::from_str(&valid_json_body()).unwrap();
    record["company_size"] = Value::from("Huge");

    let (status, body) = send(&app, post_json("/api/predict", record.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0],
        r#"company_size must be one of ["Small", "Medium", "Large"]"#
    );
}

#[tokio::test]
async fn test_predict_with_malformed_body_reports_missing_fields() {
    let dir = TempDir::new().unwrap();
    let app = build_test_app(&dir);

    let (status, body) = send(&app, post_json("/api/predict", "{not json".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 9);
    assert_eq!(errors[0], "Missing field: years_experience");
}

#[tokio::test]
async fn test_train_hot_reloads_model() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path(), 100);
    let app = build_test_app(&dir);

    let (_, before) = send(&app, post_json("/api/predict", valid_json_body())).await;
    assert_eq!(before["predicted_salary_inr"], 0);

    let (status, metrics) = send(&app, post_json("/api/train", String::new())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["n_test"], 20);
    assert!(metrics["r2"].as_f64().unwrap().is_finite());
    assert!(metrics["mae"].as_f64().unwrap().is_finite());

    let (_, after) = send(&app, post_json("/api/predict", valid_json_body())).await;
    assert!(after["predicted_salary_inr"].as_i64().unwrap() > 0);

    let (_, health) = send(&app, get("/api/health")).await;
    assert_eq!(health["model_source"], "artifact");
}

#[tokio::test]
async fn test_train_without_dataset() {
    let dir = TempDir::new().unwrap();
    let app = build_test_app(&dir);

    let (status, body) = send(&app, post_json("/api/train", String::new())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "DATASET_ERROR");
}
