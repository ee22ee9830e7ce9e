//! High-availability and disaster-recovery policy for Kubernetes clusters
//!
//! The cost multiplier is a product of independent axis factors. Each axis is
//! an exhaustive `match`, so adding a variant fails to compile until it has
//! a factor.

use crate::catalog::DistributionConfig;
use serde::{Deserialize, Serialize};

/// Minimum control plane size for the HA modes (etcd quorum)
pub const MIN_HA_CONTROL_PLANE_NODES: u32 = 3;

/// How the control plane is deployed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPlaneHa {
    /// Provider-operated control plane
    Managed,
    /// One master, no redundancy
    Single,
    /// etcd co-located on the masters
    #[default]
    StackedHa,
    /// etcd on its own members
    ExternalEtcd,
}

/// How worker nodes are spread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeDistribution {
    #[default]
    SingleAz,
    DualAz,
    MultiAz,
    MultiRegion,
}

/// Disaster recovery pattern for a cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrPattern {
    #[default]
    None,
    BackupRestore,
    WarmStandby,
    HotStandby,
    ActiveActive,
}

/// Cluster backup tooling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStrategy {
    #[default]
    None,
    Velero,
    Kasten,
    Portworx,
    CloudNative,
}

impl ControlPlaneHa {
    /// etcd replication overhead on self-managed control planes
    pub fn factor(&self) -> f64 {
        match self {
            ControlPlaneHa::Managed | ControlPlaneHa::Single => 1.0,
            ControlPlaneHa::StackedHa => 1.03,
            ControlPlaneHa::ExternalEtcd => 1.05,
        }
    }

    pub fn is_highly_available(&self) -> bool {
        matches!(self, ControlPlaneHa::StackedHa | ControlPlaneHa::ExternalEtcd)
    }
}

impl NodeDistribution {
    pub fn factor(&self) -> f64 {
        match self {
            NodeDistribution::SingleAz => 1.0,
            NodeDistribution::DualAz => 1.05,
            NodeDistribution::MultiAz => 1.10,
            NodeDistribution::MultiRegion => 1.50,
        }
    }
}

impl DrPattern {
    pub fn factor(&self) -> f64 {
        match self {
            DrPattern::None => 1.0,
            DrPattern::BackupRestore => 1.05,
            DrPattern::WarmStandby => 1.30,
            DrPattern::HotStandby => 1.80,
            DrPattern::ActiveActive => 2.00,
        }
    }
}

impl BackupStrategy {
    pub fn factor(&self) -> f64 {
        match self {
            BackupStrategy::None => 1.0,
            BackupStrategy::Velero | BackupStrategy::CloudNative => 1.02,
            BackupStrategy::Kasten => 1.03,
            BackupStrategy::Portworx => 1.04,
        }
    }
}

/// HA/DR settings for a Kubernetes sizing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct K8sHaDrConfig {
    pub control_plane_ha: ControlPlaneHa,
    /// Only meaningful for the self-managed HA modes
    pub control_plane_nodes: u32,
    pub node_distribution: NodeDistribution,
    pub dr_pattern: DrPattern,
    pub backup_strategy: BackupStrategy,
}

impl Default for K8sHaDrConfig {
    fn default() -> Self {
        Self {
            control_plane_ha: ControlPlaneHa::StackedHa,
            control_plane_nodes: MIN_HA_CONTROL_PLANE_NODES,
            node_distribution: NodeDistribution::SingleAz,
            dr_pattern: DrPattern::None,
            backup_strategy: BackupStrategy::None,
        }
    }
}

/// Per-axis factors that make up a cost multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierBreakdown {
    pub control_plane: f64,
    pub node_distribution: f64,
    pub dr: f64,
    pub backup: f64,
}

impl MultiplierBreakdown {
    pub fn total(&self) -> f64 {
        self.control_plane * self.node_distribution * self.dr * self.backup
    }
}

impl K8sHaDrConfig {
    /// Axis factors for this policy on the given distribution.
    /// Managed control planes carry no etcd overhead for the user.
    pub fn breakdown(&self, distribution: &DistributionConfig) -> MultiplierBreakdown {
        let control_plane = if distribution.has_managed_control_plane {
            1.0
        } else {
            self.control_plane_ha.factor()
        };

        MultiplierBreakdown {
            control_plane,
            node_distribution: self.node_distribution.factor(),
            dr: self.dr_pattern.factor(),
            backup: self.backup_strategy.factor(),
        }
    }

    /// Combined resource/cost multiplier applied to cluster totals
    pub fn cost_multiplier(&self, distribution: &DistributionConfig) -> f64 {
        self.breakdown(distribution).total()
    }

    /// Master nodes charged to the user
    pub fn master_count(&self, distribution: &DistributionConfig) -> u32 {
        if distribution.has_managed_control_plane {
            return 0;
        }
        match self.control_plane_ha {
            ControlPlaneHa::Single => 1,
            ControlPlaneHa::StackedHa | ControlPlaneHa::ExternalEtcd => {
                self.control_plane_nodes.max(MIN_HA_CONTROL_PLANE_NODES)
            }
            // Rejected by validation for self-managed distributions; size as HA
            ControlPlaneHa::Managed => MIN_HA_CONTROL_PLANE_NODES,
        }
    }
}
