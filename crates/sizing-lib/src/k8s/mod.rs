//! Kubernetes cluster sizing
//!
//! Turns application counts per environment into master, infra and worker
//! node counts and resource totals for a chosen distribution and topology.

mod engine;


pub use engine::{calculate_k8s, worker_count, INFRA_POOL_NODES, MIN_WORKERS};

use crate::catalog::Distribution;
use crate::hadr::K8sHaDrConfig;
use crate::models::{AppConfig, EnvironmentType, ResourceTotals, Technology};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cluster topology across environments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    /// One independent cluster per enabled environment
    #[default]
    MultiCluster,
    /// All enabled environments share one cluster, isolated by namespace
    SharedCluster,
    /// Only one environment is sized
    PerEnvironment,
}

/// Application replicas per environment class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSettings {
    pub prod: u32,
    pub non_prod: u32,
}

impl Default for ReplicaSettings {
    fn default() -> Self {
        Self { prod: 3, non_prod: 1 }
    }
}

/// Percentage buffer added to raw demand
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadroomSettings {
    pub prod: f64,
    pub non_prod: f64,
}

impl Default for HeadroomSettings {
    fn default() -> Self {
        Self { prod: 30.0, non_prod: 15.0 }
    }
}

/// Independent CPU and memory overcommit ratios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OvercommitRatio {
    pub cpu: f64,
    pub memory: f64,
}

impl OvercommitRatio {
    pub const NONE: OvercommitRatio = OvercommitRatio { cpu: 1.0, memory: 1.0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OvercommitSettings {
    pub prod: OvercommitRatio,
    pub non_prod: OvercommitRatio,
}

impl Default for OvercommitSettings {
    fn default() -> Self {
        Self {
            prod: OvercommitRatio::NONE,
            non_prod: OvercommitRatio { cpu: 1.5, memory: 1.0 },
        }
    }
}

/// Request for a Kubernetes sizing calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct K8sSizingInput {
    pub distribution: Distribution,
    pub technology: Technology,
    #[serde(default)]
    pub cluster_mode: ClusterMode,
    #[serde(default)]
    pub prod_apps: AppConfig,
    #[serde(default)]
    pub non_prod_apps: AppConfig,
    pub environments: BTreeSet<EnvironmentType>,
    /// Environment sized in `PerEnvironment` mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_environment: Option<EnvironmentType>,
    #[serde(default)]
    pub replicas: ReplicaSettings,
    #[serde(default)]
    pub headroom: HeadroomSettings,
    #[serde(default)]
    pub overcommit: OvercommitSettings,
    /// Policy for production clusters, and for shared clusters
    #[serde(default)]
    pub hadr: K8sHaDrConfig,
    /// Policy for non-production clusters; falls back to `hadr`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_prod_hadr: Option<K8sHaDrConfig>,
}

impl K8sSizingInput {
    pub fn new(distribution: Distribution, technology: Technology) -> Self {
        Self {
            distribution,
            technology,
            cluster_mode: ClusterMode::default(),
            prod_apps: AppConfig::default(),
            non_prod_apps: AppConfig::default(),
            environments: BTreeSet::new(),
            selected_environment: None,
            replicas: ReplicaSettings::default(),
            headroom: HeadroomSettings::default(),
            overcommit: OvercommitSettings::default(),
            hadr: K8sHaDrConfig::default(),
            non_prod_hadr: None,
        }
    }

    pub fn with_environments(mut self, environments: &[EnvironmentType]) -> Self {
        self.environments = environments.iter().copied().collect();
        self
    }

    pub fn with_apps(mut self, prod: AppConfig, non_prod: AppConfig) -> Self {
        self.prod_apps = prod;
        self.non_prod_apps = non_prod;
        self
    }

    pub fn with_mode(mut self, mode: ClusterMode) -> Self {
        self.cluster_mode = mode;
        self
    }

    pub fn apps_for(&self, environment: EnvironmentType) -> AppConfig {
        if environment.is_production() {
            self.prod_apps
        } else {
            self.non_prod_apps
        }
    }

    pub fn replicas_for(&self, environment: EnvironmentType) -> u32 {
        if environment.is_production() {
            self.replicas.prod
        } else {
            self.replicas.non_prod
        }
    }

    pub fn headroom_for(&self, production: bool) -> f64 {
        if production {
            self.headroom.prod
        } else {
            self.headroom.non_prod
        }
    }

    pub fn overcommit_for(&self, production: bool) -> OvercommitRatio {
        if production {
            self.overcommit.prod
        } else {
            self.overcommit.non_prod
        }
    }

    pub fn hadr_for(&self, production: bool) -> &K8sHaDrConfig {
        if production {
            &self.hadr
        } else {
            self.non_prod_hadr.as_ref().unwrap_or(&self.hadr)
        }
    }

    /// Environment sized in `PerEnvironment` mode: the explicit selection,
    /// else prod when enabled, else the first enabled environment
    pub fn effective_environment(&self) -> Option<EnvironmentType> {
        self.selected_environment.or_else(|| {
            if self.environments.contains(&EnvironmentType::Prod) {
                Some(EnvironmentType::Prod)
            } else {
                self.environments.iter().next().copied()
            }
        })
    }

    /// Same request with every tier count in both pools scaled by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            prod_apps: self.prod_apps.scaled(factor),
            non_prod_apps: self.non_prod_apps.scaled(factor),
            ..self.clone()
        }
    }
}

/// Application demand after replicas and headroom
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandSummary {
    pub cpu_cores: f64,
    pub ram_gb: f64,
    pub storage_gb: f64,
}

/// One cluster row of a sizing result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct K8sEnvironmentResult {
    /// Environment name, or `shared` for a shared cluster
    pub name: String,
    /// Environments hosted on this cluster
    pub environments: Vec<EnvironmentType>,
    pub production: bool,
    pub apps: u32,
    pub pods: u32,
    pub masters: u32,
    pub infra_nodes: u32,
    pub workers: u32,
    pub total_nodes: u32,
    pub demand: DemandSummary,
    /// HA/DR multiplier applied to the resource totals
    pub multiplier: f64,
    /// Resources of the sized nodes before the multiplier
    pub base_resources: ResourceTotals,
    /// Reported resources after the multiplier
    pub resources: ResourceTotals,
}

/// Arithmetic sum of all cluster rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct K8sGrandTotal {
    pub clusters: u32,
    pub apps: u32,
    pub pods: u32,
    pub masters: u32,
    pub infra_nodes: u32,
    pub workers: u32,
    pub total_nodes: u32,
    pub resources: ResourceTotals,
}

impl K8sGrandTotal {
    pub fn from_rows(rows: &[K8sEnvironmentResult]) -> Self {
        rows.iter().fold(K8sGrandTotal::default(), |acc, row| K8sGrandTotal {
            clusters: acc.clusters + 1,
            apps: acc.apps.saturating_add(row.apps),
            pods: acc.pods.saturating_add(row.pods),
            masters: acc.masters.saturating_add(row.masters),
            infra_nodes: acc.infra_nodes.saturating_add(row.infra_nodes),
            workers: acc.workers.saturating_add(row.workers),
            total_nodes: acc.total_nodes.saturating_add(row.total_nodes),
            resources: acc.resources + row.resources,
        })
    }
}

/// Result of a Kubernetes sizing calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct K8sSizingResult {
    pub distribution: Distribution,
    pub technology: Technology,
    pub cluster_mode: ClusterMode,
    pub environments: Vec<K8sEnvironmentResult>,
    pub grand_total: K8sGrandTotal,
}

impl K8sSizingResult {
    pub fn environment(&self, environment: EnvironmentType) -> Option<&K8sEnvironmentResult> {
        self.environments
            .iter()
            .find(|row| row.environments.contains(&environment))
    }
}
