//! WBS Server Binary
//!
//! Builds the single shared store and service, then serves the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: 127.0.0.1:5000, lenient hierarchy, sample project loaded
//! cargo run -p wbs-server
//!
//! # Strict hierarchy checks, empty breakdown, custom port
//! WBS_HIERARCHY_MODE=strict WBS_SEED_SAMPLE=false WBS_SERVER_PORT=8080 cargo run -p wbs-server
//! ```
//!
//! # Environment Variables
//!
//! - `WBS_SERVER_HOST`, `WBS_SERVER_PORT`: Listen address
//! - `CORS_ALLOW_ORIGIN`: Comma-separated allowed origins
//! - `WBS_HIERARCHY_MODE`: `lenient` or `strict`
//! - `WBS_SEED_SAMPLE`: Load the sample project on startup
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use std::sync::Arc;

use wbs_core::{WbsService, WbsStore};
use wbs_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🚀 WBS Builder Server");
    tracing::info!("==================================");

    let config = ServerConfig::from_env()?;
    config.validate()?;

    let store = if config.seed_sample_data {
        WbsStore::sample()
    } else {
        WbsStore::new()
    };
    tracing::info!("📦 Store initialized with {} nodes", store.len());

    let service = Arc::new(WbsService::new(store, config.service_config()));

    start_server(config, service).await
}
