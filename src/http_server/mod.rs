//! # HTTP Server Module
//!
//! The storefront-facing API.
//!
//! # Endpoints
//!
//! - `GET /lessons` - every lesson
//! - `GET /search?q=term` - lessons whose topic or location contains `term`
//! - `PUT /lessons/:id` - set a lesson's remaining `space`
//! - `POST /orders` - record an order
//! - `GET /images/*` - lesson images
//! - `/health` - health check

pub mod config;
pub mod errors;
pub mod lesson_routes;
pub mod observability_routes;
pub mod order_routes;
pub mod server;
pub mod state;
pub mod static_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
pub use state::AppState;
