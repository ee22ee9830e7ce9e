//! Kubernetes distribution policies

use crate::models::NodeSpecs;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported Kubernetes distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    OpenShift,
    Kubernetes,
    Rancher,
    K3s,
    MicroK8s,
    Tanzu,
    Eks,
    Aks,
    Gke,
    Oke,
    /// Red Hat OpenShift Service on AWS
    Rosa,
    /// Azure Red Hat OpenShift
    Aro,
}

impl Distribution {
    pub const ALL: [Distribution; 12] = [
        Distribution::OpenShift,
        Distribution::Kubernetes,
        Distribution::Rancher,
        Distribution::K3s,
        Distribution::MicroK8s,
        Distribution::Tanzu,
        Distribution::Eks,
        Distribution::Aks,
        Distribution::Gke,
        Distribution::Oke,
        Distribution::Rosa,
        Distribution::Aro,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Distribution::OpenShift => "OpenShift",
            Distribution::Kubernetes => "Kubernetes",
            Distribution::Rancher => "Rancher RKE2",
            Distribution::K3s => "K3s",
            Distribution::MicroK8s => "MicroK8s",
            Distribution::Tanzu => "VMware Tanzu",
            Distribution::Eks => "Amazon EKS",
            Distribution::Aks => "Azure AKS",
            Distribution::Gke => "Google GKE",
            Distribution::Oke => "Oracle OKE",
            Distribution::Rosa => "OpenShift on AWS (ROSA)",
            Distribution::Aro => "Azure Red Hat OpenShift",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sizing policy facts for one distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionConfig {
    /// Control plane is run by the provider, so no master nodes are charged
    pub has_managed_control_plane: bool,
    /// Router/registry/monitoring run on a dedicated infra pool
    pub has_infra_nodes: bool,
    pub prod_worker: NodeSpecs,
    pub non_prod_worker: NodeSpecs,
    pub master: NodeSpecs,
    pub infra: NodeSpecs,
}

impl DistributionConfig {
    pub fn worker(&self, production: bool) -> NodeSpecs {
        if production {
            self.prod_worker
        } else {
            self.non_prod_worker
        }
    }
}

const LARGE_WORKER: NodeSpecs = NodeSpecs::new(16, 64, 200);
const MEDIUM_WORKER: NodeSpecs = NodeSpecs::new(8, 32, 100);
const SMALL_WORKER: NodeSpecs = NodeSpecs::new(4, 16, 50);
const STANDARD_MASTER: NodeSpecs = NodeSpecs::new(4, 16, 100);
const LIGHT_MASTER: NodeSpecs = NodeSpecs::new(2, 4, 50);

pub fn builtin_distribution(distribution: Distribution) -> DistributionConfig {
    match distribution {
        Distribution::OpenShift => DistributionConfig {
            has_managed_control_plane: false,
            has_infra_nodes: true,
            prod_worker: LARGE_WORKER,
            non_prod_worker: MEDIUM_WORKER,
            master: NodeSpecs::new(8, 32, 120),
            infra: NodeSpecs::new(4, 16, 120),
        },
        Distribution::Kubernetes | Distribution::Rancher | Distribution::Tanzu => {
            DistributionConfig {
                has_managed_control_plane: false,
                has_infra_nodes: false,
                prod_worker: LARGE_WORKER,
                non_prod_worker: MEDIUM_WORKER,
                master: STANDARD_MASTER,
                infra: STANDARD_MASTER,
            }
        }
        Distribution::K3s | Distribution::MicroK8s => DistributionConfig {
            has_managed_control_plane: false,
            has_infra_nodes: false,
            prod_worker: MEDIUM_WORKER,
            non_prod_worker: SMALL_WORKER,
            master: LIGHT_MASTER,
            infra: LIGHT_MASTER,
        },
        Distribution::Eks | Distribution::Aks | Distribution::Gke | Distribution::Oke => {
            DistributionConfig {
                has_managed_control_plane: true,
                has_infra_nodes: false,
                prod_worker: NodeSpecs::new(16, 64, 100),
                non_prod_worker: NodeSpecs::new(8, 32, 50),
                master: NodeSpecs::new(0, 0, 0),
                infra: NodeSpecs::new(0, 0, 0),
            }
        }
        Distribution::Rosa | Distribution::Aro => DistributionConfig {
            has_managed_control_plane: true,
            has_infra_nodes: true,
            prod_worker: NodeSpecs::new(16, 64, 300),
            non_prod_worker: NodeSpecs::new(8, 32, 300),
            master: NodeSpecs::new(0, 0, 0),
            infra: NodeSpecs::new(4, 32, 300),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_distributions() {
        for d in [Distribution::Eks, Distribution::Aks, Distribution::Gke, Distribution::Oke] {
            let config = builtin_distribution(d);
            assert!(config.has_managed_control_plane, "{d}");
            assert!(!config.has_infra_nodes, "{d}");
        }
    }

    #[test]
    fn test_openshift_family_has_infra_nodes() {
        for d in [Distribution::OpenShift, Distribution::Rosa, Distribution::Aro] {
            assert!(builtin_distribution(d).has_infra_nodes, "{d}");
        }
        assert!(!builtin_distribution(Distribution::OpenShift).has_managed_control_plane);
    }

    #[test]
    fn test_worker_selection() {
        let config = builtin_distribution(Distribution::Kubernetes);
        assert_eq!(config.worker(true), LARGE_WORKER);
        assert_eq!(config.worker(false), MEDIUM_WORKER);
    }
}
