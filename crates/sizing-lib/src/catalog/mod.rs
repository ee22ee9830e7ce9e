//! Read-only lookup tables for the sizing engines
//!
//! A [`SizingCatalog`] is built once at startup (normally from the built-in
//! tables, optionally patched by a [`CatalogOverrides`] document) and passed
//! explicitly into every calculation. Engines never reach for global state,
//! so tests can substitute fixture catalogs.

mod distributions;
mod roles;
mod tiers;

pub use distributions::{builtin_distribution, Distribution, DistributionConfig};
pub use roles::{
    builtin_load_balancer, builtin_memory_factor, builtin_role_specs, LoadBalancerOption,
    LoadBalancerSpecs, RoleSpecs, ServerRole,
};
pub use tiers::builtin_tier_specs;

use crate::error::{Result, SizingError};
use crate::models::{ceil_count, AppTier, Technology, TierSpecs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable lookup tables shared by all calculations
#[derive(Debug, Clone, Default)]
pub struct SizingCatalog {
    tiers: HashMap<(Technology, AppTier), TierSpecs>,
    distributions: HashMap<Distribution, DistributionConfig>,
    roles: HashMap<(ServerRole, AppTier), RoleSpecs>,
    memory_factors: HashMap<Technology, f64>,
    load_balancers: HashMap<LoadBalancerOption, LoadBalancerSpecs>,
}

impl SizingCatalog {
    /// Catalog populated with the built-in tables
    pub fn builtin() -> Self {
        let mut catalog = Self::default();

        for technology in Technology::ALL {
            for tier in AppTier::ALL {
                catalog
                    .tiers
                    .insert((technology, tier), builtin_tier_specs(technology, tier));
            }
            catalog
                .memory_factors
                .insert(technology, builtin_memory_factor(technology));
        }
        for distribution in Distribution::ALL {
            catalog
                .distributions
                .insert(distribution, builtin_distribution(distribution));
        }
        for role in ServerRole::ALL {
            for tier in AppTier::ALL {
                catalog.roles.insert((role, tier), builtin_role_specs(role, tier));
            }
        }
        for option in LoadBalancerOption::ALL {
            catalog.load_balancers.insert(option, builtin_load_balancer(option));
        }

        catalog
    }

    /// Empty catalog, used as a starting point for test fixtures
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace entries with the ones supplied in `overrides`
    pub fn with_overrides(mut self, overrides: CatalogOverrides) -> Self {
        for entry in overrides.tiers {
            self.tiers.insert((entry.technology, entry.tier), entry.specs);
        }
        for entry in overrides.distributions {
            self.distributions.insert(entry.distribution, entry.config);
        }
        for entry in overrides.roles {
            self.roles.insert((entry.role, entry.tier), entry.specs);
        }
        for entry in overrides.load_balancers {
            self.load_balancers.insert(entry.option, entry.specs);
        }
        self
    }

    pub fn with_tier(mut self, technology: Technology, tier: AppTier, specs: TierSpecs) -> Self {
        self.tiers.insert((technology, tier), specs);
        self
    }

    pub fn with_distribution(mut self, distribution: Distribution, config: DistributionConfig) -> Self {
        self.distributions.insert(distribution, config);
        self
    }

    pub fn tier_specs(&self, technology: Technology, tier: AppTier) -> Result<TierSpecs> {
        self.tiers
            .get(&(technology, tier))
            .copied()
            .ok_or_else(|| SizingError::not_found("tier", format!("{technology}/{tier}")))
    }

    pub fn distribution(&self, distribution: Distribution) -> Result<&DistributionConfig> {
        self.distributions
            .get(&distribution)
            .ok_or_else(|| SizingError::not_found("distribution", distribution.name()))
    }

    /// CPU cores and RAM (GB) of one VM for a role, tier and runtime.
    ///
    /// Web and App roles follow the runtime's memory factor; infrastructure
    /// roles are runtime independent.
    pub fn role_specs(
        &self,
        role: ServerRole,
        tier: AppTier,
        technology: Technology,
    ) -> Result<RoleSpecs> {
        let base = self
            .roles
            .get(&(role, tier))
            .copied()
            .ok_or_else(|| SizingError::not_found("role", format!("{role}/{tier}")))?;

        if !role.runs_application_code() {
            return Ok(base);
        }

        let factor = self
            .memory_factors
            .get(&technology)
            .copied()
            .ok_or_else(|| SizingError::not_found("memory factor", technology.name()))?;

        Ok(RoleSpecs {
            cpu_cores: base.cpu_cores,
            ram_gb: ceil_count(base.ram_gb as f64 * factor).max(1),
        })
    }

    pub fn load_balancer_specs(&self, option: LoadBalancerOption) -> Result<LoadBalancerSpecs> {
        self.load_balancers
            .get(&option)
            .copied()
            .ok_or_else(|| SizingError::not_found("load balancer", option.to_string()))
    }

    /// Entries a calculation could trip over: missing keys and distributions
    /// whose workers have no CPU or memory. Empty for the built-in tables.
    pub fn defects(&self) -> Vec<String> {
        let mut defects = Vec::new();

        for technology in Technology::ALL {
            for tier in AppTier::ALL {
                if let Err(e) = self.tier_specs(technology, tier) {
                    defects.push(e.to_string());
                }
            }
            if !self.memory_factors.contains_key(&technology) {
                defects.push(SizingError::not_found("memory factor", technology.name()).to_string());
            }
        }

        for distribution in Distribution::ALL {
            let config = match self.distribution(distribution) {
                Ok(config) => config,
                Err(e) => {
                    defects.push(e.to_string());
                    continue;
                }
            };
            for (pool, worker) in [("prod", config.prod_worker), ("non-prod", config.non_prod_worker)] {
                if worker.cpu_cores == 0 || worker.ram_gb == 0 {
                    defects.push(format!("{} {} workers have no CPU or memory", distribution, pool));
                }
            }
        }

        for role in ServerRole::ALL {
            for tier in AppTier::ALL {
                if !self.roles.contains_key(&(role, tier)) {
                    defects.push(SizingError::not_found("role", format!("{role}/{tier}")).to_string());
                }
            }
        }

        for option in LoadBalancerOption::ALL {
            if let Err(e) = self.load_balancer_specs(option) {
                defects.push(e.to_string());
            }
        }

        defects
    }
}

/// Partial catalog document, e.g. loaded from a JSON file by a host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOverrides {
    pub tiers: Vec<TierOverride>,
    pub distributions: Vec<DistributionOverride>,
    pub roles: Vec<RoleOverride>,
    pub load_balancers: Vec<LoadBalancerOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierOverride {
    pub technology: Technology,
    pub tier: AppTier,
    pub specs: TierSpecs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionOverride {
    pub distribution: Distribution,
    pub config: DistributionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleOverride {
    pub role: ServerRole,
    pub tier: AppTier,
    pub specs: RoleSpecs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadBalancerOverride {
    pub option: LoadBalancerOption,
    pub specs: LoadBalancerSpecs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_complete() {
        let catalog = SizingCatalog::builtin();
        for technology in Technology::ALL {
            for tier in AppTier::ALL {
                assert!(catalog.tier_specs(technology, tier).is_ok());
                for role in ServerRole::ALL {
                    assert!(catalog.role_specs(role, tier, technology).is_ok());
                }
            }
        }
        for distribution in Distribution::ALL {
            assert!(catalog.distribution(distribution).is_ok());
        }
        for option in LoadBalancerOption::ALL {
            assert!(catalog.load_balancer_specs(option).is_ok());
        }
    }

    #[test]
    fn test_defects_report_gaps_and_dead_workers() {
        assert!(SizingCatalog::builtin().defects().is_empty());

        let mut config = builtin_distribution(Distribution::Eks);
        config.prod_worker = crate::models::NodeSpecs::new(16, 0, 200);
        let catalog = SizingCatalog::builtin().with_distribution(Distribution::Eks, config);
        let defects = catalog.defects();
        assert_eq!(defects.len(), 1);
        assert!(defects[0].contains("prod workers"), "{:?}", defects);

        let empty = SizingCatalog::empty().defects();
        let expected = Technology::ALL.len() * (AppTier::ALL.len() + 1)
            + Distribution::ALL.len()
            + ServerRole::ALL.len() * AppTier::ALL.len()
            + LoadBalancerOption::ALL.len();
        assert_eq!(empty.len(), expected);
    }

    #[test]
    fn test_missing_entry_is_not_found() {
        let catalog = SizingCatalog::empty();
        let err = catalog.tier_specs(Technology::Java, AppTier::Large).unwrap_err();
        assert!(matches!(err, SizingError::NotFound { table: "tier", .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_role_specs_follow_runtime_memory() {
        let catalog = SizingCatalog::builtin();
        let java = catalog
            .role_specs(ServerRole::App, AppTier::Medium, Technology::Java)
            .unwrap();
        let dotnet = catalog
            .role_specs(ServerRole::App, AppTier::Medium, Technology::DotNet)
            .unwrap();
        assert_eq!(dotnet, RoleSpecs::new(4, 8));
        assert_eq!(java, RoleSpecs::new(4, 12));

        // Databases ignore the application runtime
        let db_java = catalog
            .role_specs(ServerRole::Database, AppTier::Medium, Technology::Java)
            .unwrap();
        let db_go = catalog
            .role_specs(ServerRole::Database, AppTier::Medium, Technology::Go)
            .unwrap();
        assert_eq!(db_java, db_go);
    }

    #[test]
    fn test_overrides_replace_entries() {
        let overrides: CatalogOverrides = serde_json::from_str(
            r#"{
                "tiers": [
                    {"technology": "java", "tier": "small",
                     "specs": {"cpu_cores": 0.75, "ram_gb": 1.5, "storage_gb": 8.0}}
                ],
                "load_balancers": [
                    {"option": "single", "specs": {"vm_count": 1, "cpu_per_vm": 4, "ram_per_vm": 8}}
                ]
            }"#,
        )
        .unwrap();

        let catalog = SizingCatalog::builtin().with_overrides(overrides);
        let specs = catalog.tier_specs(Technology::Java, AppTier::Small).unwrap();
        assert_eq!(specs.cpu_cores, 0.75);
        let lb = catalog.load_balancer_specs(LoadBalancerOption::Single).unwrap();
        assert_eq!(lb.cpu_per_vm, 4);
        // Untouched entries keep their built-in values
        assert_eq!(
            catalog.tier_specs(Technology::Java, AppTier::Medium).unwrap(),
            builtin_tier_specs(Technology::Java, AppTier::Medium)
        );
    }
}
