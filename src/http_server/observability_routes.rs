//! Health HTTP Routes

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::errors::ApiError;
use super::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: String,
    pub backend: &'static str,
    pub version: &'static str,
}

pub fn health_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        database: state.storage.database().to_string(),
        backend: state.storage.backend_kind(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Fallback for unknown routes
pub async fn not_found_handler(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}
