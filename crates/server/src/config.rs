//! Service configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use sizing_lib::{CatalogOverrides, CostModelKind, SizingCatalog};
use std::path::Path;

/// Service configuration, read from `SIZING_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen port for the API, health and metrics endpoints
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON document with catalog overrides applied over the built-in tables
    #[serde(default)]
    pub catalog_path: Option<String>,

    /// Default cost model for growth projections
    #[serde(default)]
    pub cost_model: CostModelKind,
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            catalog_path: None,
            cost_model: CostModelKind::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SIZING"))
            .build()
            .context("Failed to read SIZING_* environment")?;

        config
            .try_deserialize()
            .context("Invalid sizing service configuration")
    }
}

/// Built-in catalog with the overrides document at `path` applied
pub fn load_catalog(path: &Path) -> Result<SizingCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
    let overrides: CatalogOverrides = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file {}", path.display()))?;

    Ok(SizingCatalog::builtin().with_overrides(overrides))
}
