//! System metric endpoints

use super::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// `500 {"error": message}`
pub(crate) fn error_response(message: impl Into<String>) -> Response {
    let message = message.into();
    log::error!("{}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// GET /api/admin/system/disk
pub async fn disk(State(state): State<AppState>) -> Response {
    match state.collector.disk().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(format!("Error getting disk info: {}", e)),
    }
}

/// GET /api/admin/system/components
pub async fn components(State(state): State<AppState>) -> Response {
    Json(state.collector.components().await).into_response()
}

/// GET /api/admin/system/performance
///
/// Metrics that could not be read are reported as `"N/A"`.
pub async fn performance(State(state): State<AppState>) -> Response {
    Json(state.collector.performance().await).into_response()
}

/// GET /api/admin/system/docker
pub async fn docker(State(state): State<AppState>) -> Response {
    match state.collector.docker().await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            log::debug!("docker stats failed: {}", e);
            error_response("Docker not available")
        }
    }
}
