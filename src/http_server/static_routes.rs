//! Static image serving

use std::path::Path;

use axum::{handler::HandlerWithoutStateExt, http::StatusCode, Router};
use tower_http::services::ServeDir;

pub const IMAGE_NOT_FOUND: &str = "Image not found";

/// Files under `dir`, mounted at `/images`
pub fn image_routes(dir: &Path) -> Router {
    let images = ServeDir::new(dir).not_found_service(image_not_found_handler.into_service());
    Router::new().nest_service("/images", images)
}

async fn image_not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, IMAGE_NOT_FOUND)
}
