//! Liveness and readiness of the sizing service
//!
//! The only dependency a sizing request has is the catalog loaded at
//! startup, so health is the outcome of checking that catalog.

use serde::{Deserialize, Serialize};
use sizing_lib::SizingCatalog;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Most catalog defects quoted in a health message
const MAX_REPORTED_DEFECTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Serving, but from the built-in tables instead of the configured ones
    Degraded,
    /// Some calculations would fail against the loaded catalog
    Unhealthy,
}

/// Result of checking the loaded catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogHealth {
    pub status: ComponentStatus,
    /// Path of the override file, or "builtin"
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: i64,
}

impl CatalogHealth {
    /// Check `catalog` for defects. `fallback` is the reason the configured
    /// override file was replaced by the built-in tables, if it was.
    pub fn check(catalog: &SizingCatalog, source: &str, fallback: Option<String>) -> Self {
        let defects = catalog.defects();

        let (status, message) = if !defects.is_empty() {
            let mut message = defects
                .iter()
                .take(MAX_REPORTED_DEFECTS)
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            if defects.len() > MAX_REPORTED_DEFECTS {
                message.push_str(&format!(" (+{} more)", defects.len() - MAX_REPORTED_DEFECTS));
            }
            (ComponentStatus::Unhealthy, Some(message))
        } else if let Some(reason) = fallback {
            (ComponentStatus::Degraded, Some(reason))
        } else {
            (ComponentStatus::Healthy, None)
        };

        Self {
            status,
            source: source.to_string(),
            message,
            checked_at: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<CatalogHealth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Catalog check result and startup flag shared with the HTTP handlers
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    catalog: Arc<RwLock<Option<CatalogHealth>>>,
    ready: Arc<RwLock<bool>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_catalog(&self, health: CatalogHealth) {
        *self.catalog.write().await = Some(health);
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    /// An unchecked catalog reports healthy; readiness covers startup
    pub async fn health(&self) -> HealthResponse {
        let catalog = self.catalog.read().await.clone();
        let status = catalog
            .as_ref()
            .map(|c| c.status)
            .unwrap_or(ComponentStatus::Healthy);
        HealthResponse { status, catalog }
    }

    pub async fn readiness(&self) -> ReadinessResponse {
        if !*self.ready.read().await {
            return ReadinessResponse {
                ready: false,
                reason: Some("catalog not loaded yet".to_string()),
            };
        }

        match self.health().await.catalog {
            Some(catalog) if catalog.status == ComponentStatus::Unhealthy => ReadinessResponse {
                ready: false,
                reason: catalog.message,
            },
            _ => ReadinessResponse {
                ready: true,
                reason: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sizing_lib::catalog::{builtin_distribution, Distribution};
    use sizing_lib::NodeSpecs;

    fn catalog_without_workers() -> SizingCatalog {
        let mut config = builtin_distribution(Distribution::Aks);
        config.prod_worker = NodeSpecs::new(0, 0, 0);
        SizingCatalog::builtin().with_distribution(Distribution::Aks, config)
    }

    #[test]
    fn test_catalog_check_classification() {
        let builtin = SizingCatalog::builtin();
        let healthy = CatalogHealth::check(&builtin, "builtin", None);
        assert_eq!(healthy.status, ComponentStatus::Healthy);
        assert!(healthy.message.is_none());

        let fallback = CatalogHealth::check(&builtin, "builtin", Some("file unreadable".into()));
        assert_eq!(fallback.status, ComponentStatus::Degraded);

        // Defects outrank the fallback reason
        let broken = CatalogHealth::check(&catalog_without_workers(), "custom.json", Some("x".into()));
        assert_eq!(broken.status, ComponentStatus::Unhealthy);
        assert!(broken.message.unwrap().contains("workers"));
    }

    #[test]
    fn test_long_defect_lists_are_truncated() {
        let health = CatalogHealth::check(&SizingCatalog::empty(), "empty.json", None);
        let message = health.message.unwrap();
        assert_eq!(message.matches("; ").count(), MAX_REPORTED_DEFECTS - 1);
        assert!(message.ends_with("more)"));
    }

    #[tokio::test]
    async fn test_not_ready_until_started() {
        let registry = HealthRegistry::new();
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
        assert!(!registry.readiness().await.ready);

        registry.set_ready(true).await;
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_degraded_catalog_stays_ready() {
        let registry = HealthRegistry::new();
        registry
            .record_catalog(CatalogHealth::check(
                &SizingCatalog::builtin(),
                "builtin",
                Some("override file unreadable".into()),
            ))
            .await;
        registry.set_ready(true).await;

        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_defective_catalog_is_not_ready() {
        let registry = HealthRegistry::new();
        registry
            .record_catalog(CatalogHealth::check(&catalog_without_workers(), "custom.json", None))
            .await;
        registry.set_ready(true).await;

        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.unwrap().contains("workers"));
    }
}
