use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    /// Cached phone sessions that have not expired yet
    sessions: usize,
}

/// Health check endpoint
///
/// Returns 200 OK while serving, 503 Service Unavailable once shutdown has begun.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, status) = if state.shutdown.is_cancelled() {
        (StatusCode::SERVICE_UNAVAILABLE, "shutting_down")
    } else {
        (StatusCode::OK, "ok")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            sessions: state.telegram.sessions().live_len(),
        }),
    )
}
