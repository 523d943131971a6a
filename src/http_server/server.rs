//! # HTTP Server
//!
//! Combines the lesson, order, image and health routers behind CORS and
//! request logging, and serves them until a shutdown signal arrives.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::lesson_routes::lesson_routes;
use super::observability_routes::{health_routes, not_found_handler};
use super::order_routes::order_routes;
use super::state::AppState;
use super::static_routes::image_routes;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};

/// HTTP server for the lesson catalog
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, Arc::new(state));
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
        Router::new()
            .merge(lesson_routes(state.clone()))
            .merge(order_routes(state.clone()))
            .merge(health_routes(state))
            .merge(image_routes(&config.images_dir))
            .fallback(not_found_handler)
            .layer(middleware::from_fn(log_requests))
            .layer(Self::cors_layer(config))
    }

    fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
        if config.cors_origins.is_empty() {
            return CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
        }

        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    Logger::warn("CORS_ORIGIN_IGNORED", &[("origin", origin)]);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn start(self) -> Result<(), std::io::Error> {
        self.start_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn start_with_shutdown<F>(self, signal: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr = listener.local_addr()?.to_string();
        log_event_with_fields(Event::ServerListening, &[("addr", &addr)]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                signal.await;
                log_event(Event::ShutdownStart);
            })
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

/// Log method, path, status and latency of every request
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let latency_ms = started.elapsed().as_millis().to_string();
    log_event_with_fields(
        Event::RequestCompleted,
        &[
            ("method", method.as_str()),
            ("path", &path),
            ("status", response.status().as_str()),
            ("latency_ms", &latency_ms),
        ],
    );
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            Logger::error("SIGNAL_HANDLER_FAILED", &[("error", &e.to_string())]);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                Logger::error("SIGNAL_HANDLER_FAILED", &[("error", &e.to_string())]);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
