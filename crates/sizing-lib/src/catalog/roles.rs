//! VM server roles and load balancer options

use crate::models::{AppTier, Technology};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a VM plays in a classic (non-container) deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerRole {
    Web,
    App,
    Database,
    Cache,
    MessageQueue,
    Search,
    Storage,
    Monitoring,
    Bastion,
}

impl ServerRole {
    pub const ALL: [ServerRole; 9] = [
        ServerRole::Web,
        ServerRole::App,
        ServerRole::Database,
        ServerRole::Cache,
        ServerRole::MessageQueue,
        ServerRole::Search,
        ServerRole::Storage,
        ServerRole::Monitoring,
        ServerRole::Bastion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServerRole::Web => "Web",
            ServerRole::App => "App",
            ServerRole::Database => "Database",
            ServerRole::Cache => "Cache",
            ServerRole::MessageQueue => "Message Queue",
            ServerRole::Search => "Search",
            ServerRole::Storage => "Storage",
            ServerRole::Monitoring => "Monitoring",
            ServerRole::Bastion => "Bastion",
        }
    }

    /// Roles whose memory footprint follows the application runtime
    pub fn runs_application_code(&self) -> bool {
        matches!(self, ServerRole::Web | ServerRole::App)
    }
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CPU and memory of one VM of a given role and tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpecs {
    pub cpu_cores: u32,
    pub ram_gb: u32,
}

impl RoleSpecs {
    pub const fn new(cpu_cores: u32, ram_gb: u32) -> Self {
        Self { cpu_cores, ram_gb }
    }
}

pub fn builtin_role_specs(role: ServerRole, tier: AppTier) -> RoleSpecs {
    use AppTier::*;
    use ServerRole::*;

    match (role, tier) {
        (Web | App | MessageQueue, Small) => RoleSpecs::new(2, 4),
        (Web | App | MessageQueue, Medium) => RoleSpecs::new(4, 8),
        (Web | App | MessageQueue, Large) => RoleSpecs::new(8, 16),
        (Web | App | MessageQueue, XLarge) => RoleSpecs::new(16, 32),

        (Database | Search, Small) => RoleSpecs::new(4, 16),
        (Database | Search, Medium) => RoleSpecs::new(8, 32),
        (Database | Search, Large) => RoleSpecs::new(16, 64),
        (Database | Search, XLarge) => RoleSpecs::new(32, 128),

        (Cache | Monitoring, Small) => RoleSpecs::new(2, 8),
        (Cache | Monitoring, Medium) => RoleSpecs::new(4, 16),
        (Cache | Monitoring, Large) => RoleSpecs::new(8, 32),
        (Cache | Monitoring, XLarge) => RoleSpecs::new(16, 64),

        (Storage, Small) => RoleSpecs::new(2, 4),
        (Storage, Medium) => RoleSpecs::new(4, 8),
        (Storage, Large) => RoleSpecs::new(8, 16),
        (Storage, XLarge) => RoleSpecs::new(8, 32),

        (Bastion, Small) => RoleSpecs::new(1, 2),
        (Bastion, Medium) => RoleSpecs::new(2, 4),
        (Bastion, Large) => RoleSpecs::new(2, 8),
        (Bastion, XLarge) => RoleSpecs::new(4, 8),
    }
}

/// Memory factor applied to application-hosting roles per runtime
pub fn builtin_memory_factor(technology: Technology) -> f64 {
    match technology {
        Technology::DotNet | Technology::NodeJs | Technology::Python => 1.0,
        Technology::Java => 1.5,
        Technology::Go => 0.5,
        Technology::Mendix | Technology::OutSystems => 1.5,
    }
}

/// Load balancer deployment choice for a VM environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalancerOption {
    #[default]
    None,
    Single,
    HaPair,
    /// Provider-managed load balancer, no VMs charged
    CloudManaged,
}

impl LoadBalancerOption {
    pub const ALL: [LoadBalancerOption; 4] = [
        LoadBalancerOption::None,
        LoadBalancerOption::Single,
        LoadBalancerOption::HaPair,
        LoadBalancerOption::CloudManaged,
    ];
}

impl fmt::Display for LoadBalancerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadBalancerOption::None => "none",
            LoadBalancerOption::Single => "single",
            LoadBalancerOption::HaPair => "ha_pair",
            LoadBalancerOption::CloudManaged => "cloud_managed",
        };
        f.write_str(name)
    }
}

/// VMs charged for a load balancer option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerSpecs {
    pub vm_count: u32,
    pub cpu_per_vm: u32,
    pub ram_per_vm: u32,
}

pub fn builtin_load_balancer(option: LoadBalancerOption) -> LoadBalancerSpecs {
    match option {
        LoadBalancerOption::None | LoadBalancerOption::CloudManaged => LoadBalancerSpecs {
            vm_count: 0,
            cpu_per_vm: 0,
            ram_per_vm: 0,
        },
        LoadBalancerOption::Single => LoadBalancerSpecs {
            vm_count: 1,
            cpu_per_vm: 2,
            ram_per_vm: 4,
        },
        LoadBalancerOption::HaPair => LoadBalancerSpecs {
            vm_count: 2,
            cpu_per_vm: 2,
            ram_per_vm: 4,
        },
    }
}
