//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::inference::Prediction;
use crate::monitoring::PROMETHEUS_CONTENT_TYPE;
use crate::schema::{FieldViolation, PatientRecord};

use super::error::{Result, ServerError};
use super::state::AppState;

/// Liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "API is operational" }))
}

/// Score one patient record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Prediction>> {
    let Json(body) = body.map_err(|rejection| {
        ServerError::Validation(vec![FieldViolation::body(rejection.body_text(), "json_invalid")])
    })?;

    let record = PatientRecord::from_json(&body).map_err(ServerError::Validation)?;
    info!(record = ?record, "Received prediction request");

    // Forest voting fans out on rayon; keep it off the async workers
    let scorer = Arc::clone(&state);
    let prediction = tokio::task::spawn_blocking(move || scorer.predictor.predict(&record))
        .await
        .map_err(|e| ServerError::Internal(format!("prediction task failed: {}", e)))??;
    state.metrics.record(prediction.latency_seconds);

    info!(
        predicted_class = prediction.predicted_class,
        probability = prediction.probability,
        latency_seconds = prediction.latency_seconds,
        "Prediction served"
    );
    Ok(Json(prediction))
}

/// Prometheus text exposition of the request counter
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.metrics.render_prometheus(),
    )
}

pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
