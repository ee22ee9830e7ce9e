//! Sizing Server - infrastructure sizing service
//!
//! Serves Kubernetes and VM sizing, growth projections and catalog
//! previews over HTTP, with health and Prometheus endpoints.

use anyhow::Result;
use sizing_lib::{SizingCatalog, SizingMetrics, StructuredLogger};
use sizing_server::{
    api,
    config::{self, ServerConfig},
    health::{CatalogHealth, ComponentStatus, HealthRegistry},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const SERVICE_NAME: &str = "sizing-server";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting sizing-server");

    let config = ServerConfig::load()?;
    info!(port = config.port, cost_model = %config.cost_model, "Server configured");

    let health_registry = HealthRegistry::new();

    // A broken override file degrades to the built-in tables instead of refusing to start
    let (catalog, catalog_source, fallback) = match &config.catalog_path {
        Some(path) => match config::load_catalog(Path::new(path)) {
            Ok(catalog) => (catalog, path.clone(), None),
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Falling back to built-in catalog");
                (SizingCatalog::builtin(), "builtin".to_string(), Some(format!("{:#}", e)))
            }
        },
        None => (SizingCatalog::builtin(), "builtin".to_string(), None),
    };

    let catalog_health = CatalogHealth::check(&catalog, &catalog_source, fallback);
    if catalog_health.status == ComponentStatus::Unhealthy {
        warn!(
            source = %catalog_source,
            defects = catalog_health.message.as_deref().unwrap_or_default(),
            "Catalog has defects, readiness will fail"
        );
    }
    health_registry.record_catalog(catalog_health).await;

    let metrics = SizingMetrics::new();
    let logger = StructuredLogger::new(SERVICE_NAME);
    logger.log_startup(SERVER_VERSION, &catalog_source, config.cost_model.name());

    let app_state = Arc::new(api::AppState::new(
        catalog,
        config.cost_model,
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    health_registry.set_ready(true).await;

    api::serve(config.port, app_state, async {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
