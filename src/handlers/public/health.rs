use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "markdown-editor-api";

/// GET /health - liveness plus database reachability
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now(),
            "database": "ok",
        }))
        .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiError::service_unavailable("database connection failed").into_response()
        }
    }
}
