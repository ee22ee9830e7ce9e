//! VM fleet sizing
//!
//! VM environments are always isolated: every environment is sized on its
//! own and the grand total is their sum.

mod engine;

pub use engine::{calculate_vm, dr_fraction, effective_instances, ha_multiplier};

use crate::catalog::{LoadBalancerOption, ServerRole};
use crate::models::{AppTier, EnvironmentType, ResourceTotals, Technology};
use serde::{Deserialize, Serialize};

/// Redundancy pattern for the roles of one VM environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaPattern {
    #[default]
    None,
    /// Configured instances already share the load
    ActiveActive,
    /// One standby instance per role
    ActivePassive,
    #[serde(rename = "n_plus_1")]
    NPlus1,
    #[serde(rename = "n_plus_2")]
    NPlus2,
}

/// Secondary-site disaster recovery for a VM environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VmDrPattern {
    #[default]
    None,
    WarmStandby,
    HotStandby,
    MultiRegion { extra_regions: u32 },
}

/// Instances of one server role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRoleConfig {
    pub role: ServerRole,
    pub instances: u32,
    pub tier: AppTier,
}

impl VmRoleConfig {
    pub fn new(role: ServerRole, instances: u32, tier: AppTier) -> Self {
        Self { role, instances, tier }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_storage_gb() -> u32 {
    100
}

/// Roles and policies of one VM environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmEnvironmentConfig {
    pub environment: EnvironmentType,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub roles: Vec<VmRoleConfig>,
    #[serde(default)]
    pub ha_pattern: HaPattern,
    #[serde(default)]
    pub dr_pattern: VmDrPattern,
    #[serde(default)]
    pub load_balancer: LoadBalancerOption,
    /// Disk attached to every VM in the environment
    #[serde(default = "default_storage_gb")]
    pub storage_gb_per_vm: u32,
}

impl VmEnvironmentConfig {
    pub fn new(environment: EnvironmentType, roles: Vec<VmRoleConfig>) -> Self {
        Self {
            environment,
            enabled: true,
            roles,
            ha_pattern: HaPattern::None,
            dr_pattern: VmDrPattern::None,
            load_balancer: LoadBalancerOption::None,
            storage_gb_per_vm: default_storage_gb(),
        }
    }

    pub fn with_ha(mut self, pattern: HaPattern) -> Self {
        self.ha_pattern = pattern;
        self
    }

    pub fn with_dr(mut self, pattern: VmDrPattern) -> Self {
        self.dr_pattern = pattern;
        self
    }

    pub fn with_load_balancer(mut self, option: LoadBalancerOption) -> Self {
        self.load_balancer = option;
        self
    }

    /// Same environment with every role's instance count scaled by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let roles = self
            .roles
            .iter()
            .map(|r| VmRoleConfig {
                instances: (r.instances as f64 * factor).round().max(0.0) as u32,
                ..*r
            })
            .collect();
        Self { roles, ..self.clone() }
    }
}

/// Request for a VM sizing calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSizingInput {
    pub technology: Technology,
    pub environments: Vec<VmEnvironmentConfig>,
}

impl VmSizingInput {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            technology: self.technology,
            environments: self.environments.iter().map(|e| e.scaled(factor)).collect(),
        }
    }

    /// Configured role instances across enabled environments
    pub fn total_instances(&self) -> u32 {
        self.environments
            .iter()
            .filter(|e| e.enabled)
            .flat_map(|e| e.roles.iter())
            .fold(0u32, |acc, r| acc.saturating_add(r.instances))
    }
}

/// Sized role within an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRoleResult {
    pub role: ServerRole,
    pub tier: AppTier,
    pub configured_instances: u32,
    pub effective_instances: u32,
    pub cpu_per_vm: u32,
    pub ram_per_vm: u32,
    pub resources: ResourceTotals,
}

/// Secondary site required by the DR pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmDrSite {
    pub vm_count: u32,
    pub resources: ResourceTotals,
}

/// Sized VM environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmEnvironmentResult {
    pub environment: EnvironmentType,
    pub ha_pattern: HaPattern,
    pub dr_pattern: VmDrPattern,
    pub roles: Vec<VmRoleResult>,
    pub load_balancer_vms: u32,
    /// Role and load balancer VMs at the primary site
    pub primary_vms: u32,
    pub primary_resources: ResourceTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dr_site: Option<VmDrSite>,
    /// Primary plus DR site
    pub total_vms: u32,
    pub resources: ResourceTotals,
}

/// Arithmetic sum of all environment rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmGrandTotal {
    pub environments: u32,
    pub primary_vms: u32,
    pub dr_vms: u32,
    pub total_vms: u32,
    pub resources: ResourceTotals,
}

impl VmGrandTotal {
    pub fn from_rows(rows: &[VmEnvironmentResult]) -> Self {
        rows.iter().fold(VmGrandTotal::default(), |acc, row| VmGrandTotal {
            environments: acc.environments + 1,
            primary_vms: acc.primary_vms.saturating_add(row.primary_vms),
            dr_vms: acc
                .dr_vms
                .saturating_add(row.dr_site.map(|s| s.vm_count).unwrap_or(0)),
            total_vms: acc.total_vms.saturating_add(row.total_vms),
            resources: acc.resources + row.resources,
        })
    }
}

/// Result of a VM sizing calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSizingResult {
    pub technology: Technology,
    pub environments: Vec<VmEnvironmentResult>,
    pub grand_total: VmGrandTotal,
}

impl VmSizingResult {
    pub fn environment(&self, environment: EnvironmentType) -> Option<&VmEnvironmentResult> {
        self.environments.iter().find(|e| e.environment == environment)
    }
}
