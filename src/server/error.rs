//! Error types for the server

use crate::error::HeartError;
use crate::schema::FieldViolation;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

pub const INTERNAL_ERROR_DETAIL: &str = "An internal error occurred.";

#[derive(Error, Debug)]
pub enum ServerError {
    /// Request body failed schema validation
    #[error("Invalid request body ({} violation(s))", .0.len())]
    Validation(Vec<FieldViolation>),

    #[error("Prediction could not be completed")]
    PredictionFailed,

    #[error("Not Found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn validation_body(violations: &[FieldViolation]) -> Value {
        let detail: Vec<Value> = violations
            .iter()
            .map(|v| {
                let loc = match &v.field {
                    Some(field) => json!(["body", field]),
                    None => json!(["body"]),
                };
                json!({ "loc": loc, "msg": v.message, "type": v.kind })
            })
            .collect();
        json!({ "detail": detail })
    }
}

impl From<HeartError> for ServerError {
    fn from(err: HeartError) -> Self {
        match err {
            HeartError::PredictionFailure => ServerError::PredictionFailed,
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::Validation(violations) => {
                tracing::info!(violations = violations.len(), "Rejected invalid request body");
                (StatusCode::UNPROCESSABLE_ENTITY, Self::validation_body(violations))
            }
            ServerError::PredictionFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": "Prediction could not be completed" }),
            ),
            ServerError::NotFound => (StatusCode::NOT_FOUND, json!({ "detail": "Not Found" })),
            ServerError::Internal(msg) => {
                tracing::error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": INTERNAL_ERROR_DETAIL }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
