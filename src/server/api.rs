//! API route definitions

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::error::INTERNAL_ERROR_DETAIL;
use super::{handlers, state::AppState};

/// Turn a handler panic into the generic 500 body; the payload is logged only
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(detail = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": INTERNAL_ERROR_DETAIL })),
    )
        .into_response()
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    with_middleware(
        Router::new()
            .route("/", get(handlers::health_check))
            .route("/predict", post(handlers::predict))
            .route("/metrics", get(handlers::metrics))
            .fallback(handlers::not_found)
            .with_state(state),
    )
}

fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}
