//! VM sizing algorithm

use super::{
    HaPattern, VmDrPattern, VmDrSite, VmEnvironmentConfig, VmEnvironmentResult, VmGrandTotal,
    VmRoleResult, VmSizingInput, VmSizingResult,
};
use crate::catalog::SizingCatalog;
use crate::error::Result;
use crate::models::{ceil_count, ResourceTotals, Technology};
use tracing::debug;

/// Share of primary capacity kept at a warm standby site
const WARM_STANDBY_FRACTION: f64 = 0.5;

/// Instances actually provisioned for `configured` instances under `pattern`
pub fn effective_instances(pattern: HaPattern, configured: u32) -> u32 {
    if configured == 0 {
        return 0;
    }
    match pattern {
        HaPattern::None | HaPattern::ActiveActive => configured,
        HaPattern::ActivePassive | HaPattern::NPlus1 => configured.saturating_add(1),
        HaPattern::NPlus2 => configured.saturating_add(2),
    }
}

/// Capacity multiplier of `pattern` for a single configured instance
pub fn ha_multiplier(pattern: HaPattern) -> f64 {
    effective_instances(pattern, 1) as f64
}

/// Fraction of primary resources duplicated at the secondary site
pub fn dr_fraction(pattern: VmDrPattern) -> f64 {
    match pattern {
        VmDrPattern::None => 0.0,
        VmDrPattern::WarmStandby => WARM_STANDBY_FRACTION,
        VmDrPattern::HotStandby => 1.0,
        VmDrPattern::MultiRegion { extra_regions } => extra_regions as f64,
    }
}

/// Size every enabled VM environment in `input`
pub fn calculate_vm(catalog: &SizingCatalog, input: &VmSizingInput) -> Result<VmSizingResult> {
    let environments = input
        .environments
        .iter()
        .filter(|env| env.enabled)
        .map(|env| size_environment(catalog, input.technology, env))
        .collect::<Result<Vec<_>>>()?;

    let grand_total = VmGrandTotal::from_rows(&environments);

    Ok(VmSizingResult {
        technology: input.technology,
        environments,
        grand_total,
    })
}

fn size_environment(
    catalog: &SizingCatalog,
    technology: Technology,
    env: &VmEnvironmentConfig,
) -> Result<VmEnvironmentResult> {
    let disk = env.storage_gb_per_vm as u64;

    let roles = env
        .roles
        .iter()
        .map(|config| -> Result<VmRoleResult> {
            let specs = catalog.role_specs(config.role, config.tier, technology)?;
            let effective = effective_instances(env.ha_pattern, config.instances);
            let count = effective as u64;
            Ok(VmRoleResult {
                role: config.role,
                tier: config.tier,
                configured_instances: config.instances,
                effective_instances: effective,
                cpu_per_vm: specs.cpu_cores,
                ram_per_vm: specs.ram_gb,
                resources: ResourceTotals::new(
                    specs.cpu_cores as u64 * count,
                    specs.ram_gb as u64 * count,
                    disk * count,
                ),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let lb = catalog.load_balancer_specs(env.load_balancer)?;
    let lb_count = lb.vm_count as u64;
    let lb_resources = ResourceTotals::new(
        lb.cpu_per_vm as u64 * lb_count,
        lb.ram_per_vm as u64 * lb_count,
        disk * lb_count,
    );

    let primary_vms = roles
        .iter()
        .fold(lb.vm_count, |acc, r| acc.saturating_add(r.effective_instances));
    let primary_resources = roles.iter().map(|r| r.resources).sum::<ResourceTotals>() + lb_resources;

    let fraction = dr_fraction(env.dr_pattern);
    let dr_site = (fraction > 0.0 && primary_vms > 0).then(|| VmDrSite {
        vm_count: ceil_count(primary_vms as f64 * fraction),
        resources: primary_resources.scaled_ceil(fraction),
    });

    let total_vms = primary_vms.saturating_add(dr_site.map(|s| s.vm_count).unwrap_or(0));
    let resources = primary_resources + dr_site.map(|s| s.resources).unwrap_or_default();

    debug!(
        environment = %env.environment,
        ha_pattern = ?env.ha_pattern,
        dr_pattern = ?env.dr_pattern,
        primary_vms,
        total_vms,
        cpu_cores = resources.cpu_cores,
        ram_gb = resources.ram_gb,
        "Sized VM environment"
    );

    Ok(VmEnvironmentResult {
        environment: env.environment,
        ha_pattern: env.ha_pattern,
        dr_pattern: env.dr_pattern,
        roles,
        load_balancer_vms: lb.vm_count,
        primary_vms,
        primary_resources,
        dr_site,
        total_vms,
        resources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LoadBalancerOption, ServerRole};
    use crate::models::{AppTier, EnvironmentType};
    use crate::vm::VmRoleConfig;

    fn web(instances: u32) -> VmRoleConfig {
        VmRoleConfig::new(ServerRole::Web, instances, AppTier::Medium)
    }

    fn single_env(config: VmEnvironmentConfig) -> VmSizingInput {
        VmSizingInput {
            technology: Technology::DotNet,
            environments: vec![config],
        }
    }

    #[test]
    fn test_active_passive_adds_one_standby() {
        let catalog = SizingCatalog::builtin();
        let env = VmEnvironmentConfig::new(EnvironmentType::Prod, vec![web(2)])
            .with_ha(HaPattern::ActivePassive);
        let result = calculate_vm(&catalog, &single_env(env)).unwrap();

        let prod = result.environment(EnvironmentType::Prod).unwrap();
        assert_eq!(prod.total_vms, 3);
        assert_eq!(prod.roles[0].configured_instances, 2);
        assert_eq!(prod.roles[0].effective_instances, 3);
        // Standby is charged at full cost: 3 x (4 cores, 8 GB)
        assert_eq!(prod.resources.cpu_cores, 12);
        assert_eq!(prod.resources.ram_gb, 24);
        assert_eq!(prod.resources.storage_gb, 300);
    }

    #[test]
    fn test_effective_instances_per_pattern() {
        assert_eq!(effective_instances(HaPattern::None, 4), 4);
        assert_eq!(effective_instances(HaPattern::ActiveActive, 4), 4);
        assert_eq!(effective_instances(HaPattern::ActivePassive, 4), 5);
        assert_eq!(effective_instances(HaPattern::NPlus1, 4), 5);
        assert_eq!(effective_instances(HaPattern::NPlus2, 4), 6);
        assert_eq!(effective_instances(HaPattern::NPlus2, 0), 0);
    }

    #[test]
    fn test_ha_multiplier_preview() {
        assert_eq!(ha_multiplier(HaPattern::None), 1.0);
        assert_eq!(ha_multiplier(HaPattern::ActiveActive), 1.0);
        assert_eq!(ha_multiplier(HaPattern::ActivePassive), 2.0);
        assert_eq!(ha_multiplier(HaPattern::NPlus2), 3.0);
    }

    #[test]
    fn test_dr_site_is_additive() {
        let catalog = SizingCatalog::builtin();
        let roles = vec![web(2), VmRoleConfig::new(ServerRole::Database, 1, AppTier::Large)];

        let plain = VmEnvironmentConfig::new(EnvironmentType::Prod, roles.clone());
        let plain = calculate_vm(&catalog, &single_env(plain)).unwrap();
        let primary = plain.grand_total.resources;
        assert_eq!(plain.grand_total.dr_vms, 0);

        let hot = VmEnvironmentConfig::new(EnvironmentType::Prod, roles.clone())
            .with_dr(VmDrPattern::HotStandby);
        let hot = calculate_vm(&catalog, &single_env(hot)).unwrap();
        assert_eq!(hot.grand_total.total_vms, 6);
        assert_eq!(hot.grand_total.resources.cpu_cores, primary.cpu_cores * 2);

        let warm = VmEnvironmentConfig::new(EnvironmentType::Prod, roles.clone())
            .with_dr(VmDrPattern::WarmStandby);
        let warm = calculate_vm(&catalog, &single_env(warm)).unwrap();
        let site = warm.environments[0].dr_site.unwrap();
        assert_eq!(site.vm_count, 2);
        assert_eq!(site.resources.cpu_cores, 12);
        assert_eq!(warm.environments[0].primary_resources, primary);

        let regions = VmEnvironmentConfig::new(EnvironmentType::Prod, roles)
            .with_dr(VmDrPattern::MultiRegion { extra_regions: 2 });
        let regions = calculate_vm(&catalog, &single_env(regions)).unwrap();
        assert_eq!(regions.grand_total.total_vms, 9);
        assert_eq!(regions.grand_total.dr_vms, 6);
    }

    #[test]
    fn test_load_balancer_vms() {
        let catalog = SizingCatalog::builtin();
        let env = VmEnvironmentConfig::new(EnvironmentType::Prod, vec![web(2)])
            .with_load_balancer(LoadBalancerOption::HaPair);
        let result = calculate_vm(&catalog, &single_env(env)).unwrap();
        let prod = &result.environments[0];
        assert_eq!(prod.load_balancer_vms, 2);
        assert_eq!(prod.primary_vms, 4);
        assert_eq!(prod.resources.cpu_cores, 2 * 4 + 2 * 2);
    }

    #[test]
    fn test_grand_total_sums_enabled_environments() {
        let catalog = SizingCatalog::builtin();
        let mut disabled = VmEnvironmentConfig::new(EnvironmentType::Test, vec![web(10)]);
        disabled.enabled = false;

        let input = VmSizingInput {
            technology: Technology::Java,
            environments: vec![
                VmEnvironmentConfig::new(EnvironmentType::Dev, vec![web(1)]),
                disabled,
                VmEnvironmentConfig::new(
                    EnvironmentType::Prod,
                    vec![web(3), VmRoleConfig::new(ServerRole::Cache, 2, AppTier::Small)],
                )
                .with_ha(HaPattern::NPlus1)
                .with_dr(VmDrPattern::WarmStandby),
            ],
        };

        let result = calculate_vm(&catalog, &input).unwrap();
        assert_eq!(result.environments.len(), 2);
        assert!(result.environment(EnvironmentType::Test).is_none());

        let vms: u32 = result.environments.iter().map(|e| e.total_vms).sum();
        let ram: u64 = result.environments.iter().map(|e| e.resources.ram_gb).sum();
        assert_eq!(result.grand_total.total_vms, vms);
        assert_eq!(result.grand_total.resources.ram_gb, ram);
        assert_eq!(result.grand_total.environments, 2);
    }

    #[test]
    fn test_dr_pattern_json_shape() {
        let pattern: VmDrPattern =
            serde_json::from_str(r#"{"multi_region": {"extra_regions": 1}}"#).unwrap();
        assert_eq!(pattern, VmDrPattern::MultiRegion { extra_regions: 1 });
        let pattern: VmDrPattern = serde_json::from_str(r#""warm_standby""#).unwrap();
        assert_eq!(pattern, VmDrPattern::WarmStandby);
        let ha: HaPattern = serde_json::from_str(r#""n_plus_1""#).unwrap();
        assert_eq!(ha, HaPattern::NPlus1);
    }

    #[test]
    fn test_scaled_rounds_instances() {
        let env = VmEnvironmentConfig::new(EnvironmentType::Prod, vec![web(3)]);
        assert_eq!(env.scaled(1.5).roles[0].instances, 5);
        assert_eq!(env.scaled(1.0), env);
    }
}
