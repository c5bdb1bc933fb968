//! HTTP API for the WBS builder
//!
//! Exposes one shared `WbsService` over a small JSON REST API. The router is
//! built from endpoint modules merged together, with a CORS layer restricted
//! to the configured origins and request tracing on top.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=wbs_server=debug cargo run -p wbs-server
//! ```
//!
//! See [`config`] for the environment variables that shape the server.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use wbs_core::WbsService;

pub mod config;

mod http_error;
mod node_endpoints;

pub use config::{ConfigError, ServerConfig};
pub use http_error::HttpError;
pub use node_endpoints::{HealthStatus, MessageResponse, MoveNodeInput};

/// Application state shared across all endpoints
///
/// The service serializes writes internally, so handlers hold no locks of
/// their own.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WbsService>,
}

impl AppState {
    pub fn new(service: Arc<WbsService>) -> Self {
        Self { service }
    }
}

/// Create the application router with all endpoint modules
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(node_endpoints::routes(state))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS layer allowing the given origins
///
/// Origins that are not valid header values are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns error if server fails to bind or start.
pub async fn start_server(config: ServerConfig, service: Arc<WbsService>) -> anyhow::Result<()> {
    let app = create_router(AppState::new(service), &config);

    let addr = config.bind_address();
    tracing::info!("🚀 WBS server starting on http://{}", addr);
    tracing::info!("📡 CORS enabled for {}", config.cors_origins.join(", "));
    tracing::info!("🌳 Hierarchy mode: {}", config.hierarchy_mode);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
