//! Integration test: Server API endpoints

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use heart_predict::inference::PredictionService;
use heart_predict::preprocessing::Scaler;
use heart_predict::server::{build_state, create_router, AppState, ServerConfig};
use heart_predict::training::{CandidateModel, LogisticRegression, PipelineConfig, TrainingPipeline};
use ndarray::Array2;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tempfile::TempDir;
use tower::ServiceExt;

/// Artifacts trained once and shared by every test in this file
fn artifacts_dir() -> PathBuf {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    let dir = DIR.get_or_init(|| {
        let dir = TempDir::new().unwrap();
        let data = common::write_heart_csv(dir.path());
        let config = PipelineConfig::new(data)
            .with_artifact_dir(dir.path().join("artifacts"))
            .with_tracking_dir(dir.path().join("mlruns"));
        TrainingPipeline::new(config).run().unwrap();
        dir
    });
    dir.path().join("artifacts")
}

fn test_app() -> axum::Router {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        artifacts_dir: artifacts_dir(),
    };
    create_router(build_state(&config).unwrap())
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "status": "API is operational" }));
}

#[tokio::test]
async fn test_predict_sample_payload() {
    let app = test_app();
    let (status, body) = send(&app, post_json(&common::sample_payload())).await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_str(&body).unwrap();
    let class = body["predicted_class"].as_u64().unwrap();
    assert!(class == 0 || class == 1);
    let probability = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    assert!(body["latency_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_missing_field_rejected_without_counting() {
    let app = test_app();
    let mut payload = common::sample_payload();
    payload.as_object_mut().unwrap().remove("age");

    let (status, body) = send(&app, post_json(&payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["detail"][0]["loc"], json!(["body", "age"]));

    let (_, metrics) = send(&app, get("/metrics")).await;
    assert!(metrics.contains("total_prediction_requests 0\n"));
}

#[tokio::test]
async fn test_wrong_type_and_out_of_range_rejected() {
    let app = test_app();

    let mut payload = common::sample_payload();
    payload["oldpeak"] = json!("abc");
    let (status, _) = send(&app, post_json(&payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut payload = common::sample_payload();
    payload["age"] = json!(150);
    let (status, body) = send(&app, post_json(&payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["detail"][0]["loc"], json!(["body", "age"]));
}

#[tokio::test]
async fn test_malformed_bodies_rejected() {
    let app = test_app();

    let (status, body) = send(&app, post_json(&json!([1, 2, 3]))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));

    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_metrics_count_successful_predictions() {
    let app = test_app();
    let mut total_latency = 0.0;
    for _ in 0..3 {
        let (status, body) = send(&app, post_json(&common::sample_payload())).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        total_latency += body["latency_seconds"].as_f64().unwrap();
    }

    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("# TYPE total_prediction_requests counter"));
    assert!(text.contains("total_prediction_requests 3\n"));
    assert!(text.contains("# TYPE average_prediction_latency_seconds gauge"));

    let average: f64 = text
        .lines()
        .find_map(|l| l.strip_prefix("average_prediction_latency_seconds "))
        .unwrap()
        .parse()
        .unwrap();
    assert!((average - total_latency / 3.0).abs() < 1e-9);
}

/// Scaler fitted on 3 columns cannot transform a 13-feature record
fn mismatched_app() -> axum::Router {
    let mut scaler = Scaler::new();
    scaler.fit(&Array2::<f64>::zeros((4, 3))).unwrap();
    let model = CandidateModel::LogisticRegression(LogisticRegression::new());
    let state = AppState::new(PredictionService::new(model, scaler));
    create_router(Arc::new(state))
}

#[tokio::test]
async fn test_prediction_failure_is_generic_500() {
    let app = mismatched_app();
    let (status, body) = send(&app, post_json(&common::sample_payload())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "detail": "Prediction could not be completed" }));

    let (_, metrics) = send(&app, get("/metrics")).await;
    assert!(metrics.contains("total_prediction_requests 0\n"));
    assert!(metrics.contains("average_prediction_latency_seconds 0\n"));
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = test_app();
    let (status, body) = send(&app, get("/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "detail": "Not Found" }));
}
