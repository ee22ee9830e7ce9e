//! Business-rule checks run by callers before invoking the engines
//!
//! The engines trust their input; these checks fail fast with the name of
//! the first offending field.

use crate::catalog::SizingCatalog;
use crate::error::{Result, SizingError};
use crate::growth::{
    growth_factor, BaselineMetrics, GrowthBaseline, GrowthPattern, GrowthRequest, GrowthSettings,
};
use crate::hadr::{ControlPlaneHa, K8sHaDrConfig};
use crate::k8s::{ClusterMode, K8sSizingInput, OvercommitRatio};
use crate::models::EnvironmentType;
use crate::vm::{dr_fraction, VmDrPattern, VmSizingInput};
use std::collections::HashSet;

/// Upper bound for the etcd members of a self-managed control plane
pub const MAX_CONTROL_PLANE_NODES: u32 = 7;

/// Longest supported projection horizon
pub const MAX_PROJECTION_YEARS: u32 = 10;

pub const MAX_HEADROOM_PERCENT: f64 = 200.0;
pub const MAX_OVERCOMMIT_RATIO: f64 = 10.0;
pub const MAX_REPLICAS: u32 = 100;
pub const MAX_DR_REGIONS: u32 = 10;

/// Largest application count a sizing, or any projected year, may reach
pub const MAX_APPS: u64 = 1_000_000;

/// Largest pod count a sizing, or any projected year, may reach
pub const MAX_PODS: u64 = 10_000_000;

/// Largest node or VM count a sizing, or any projected year, may reach
pub const MAX_NODES: u64 = 1_000_000;

pub fn validate_k8s_input(catalog: &SizingCatalog, input: &K8sSizingInput) -> Result<()> {
    if input.environments.is_empty() {
        return Err(SizingError::invalid(
            "environments",
            "at least one environment must be enabled",
        ));
    }

    if input.cluster_mode == ClusterMode::PerEnvironment {
        if let Some(selected) = input.selected_environment {
            if !input.environments.contains(&selected) {
                return Err(SizingError::invalid(
                    "selected_environment",
                    format!("{} is not an enabled environment", selected),
                ));
            }
        }
    }

    check_replicas("replicas.prod", input.replicas.prod)?;
    check_replicas("replicas.non_prod", input.replicas.non_prod)?;
    check_headroom("headroom.prod", input.headroom.prod)?;
    check_headroom("headroom.non_prod", input.headroom.non_prod)?;
    check_overcommit("overcommit.prod", input.overcommit.prod)?;
    check_overcommit("overcommit.non_prod", input.overcommit.non_prod)?;
    check_k8s_demand("", input, 1.0)?;

    let distribution = catalog.distribution(input.distribution)?;
    check_hadr("hadr", &input.hadr, distribution.has_managed_control_plane)?;
    if let Some(non_prod) = &input.non_prod_hadr {
        check_hadr("non_prod_hadr", non_prod, distribution.has_managed_control_plane)?;
    }

    Ok(())
}

fn check_replicas(field: &str, replicas: u32) -> Result<()> {
    if replicas == 0 || replicas > MAX_REPLICAS {
        return Err(SizingError::invalid(
            field,
            format!("must be between 1 and {}", MAX_REPLICAS),
        ));
    }
    Ok(())
}

fn check_headroom(field: &str, percent: f64) -> Result<()> {
    if !percent.is_finite() || !(0.0..=MAX_HEADROOM_PERCENT).contains(&percent) {
        return Err(SizingError::invalid(
            field,
            format!("must be between 0 and {}%", MAX_HEADROOM_PERCENT),
        ));
    }
    Ok(())
}

fn check_overcommit(field: &str, ratio: OvercommitRatio) -> Result<()> {
    for (axis, value) in [("cpu", ratio.cpu), ("memory", ratio.memory)] {
        if !value.is_finite() || !(1.0..=MAX_OVERCOMMIT_RATIO).contains(&value) {
            return Err(SizingError::invalid(
                format!("{}.{}", field, axis),
                format!("ratio must be between 1.0 and {}", MAX_OVERCOMMIT_RATIO),
            ));
        }
    }
    Ok(())
}

fn check_hadr(field: &str, hadr: &K8sHaDrConfig, managed: bool) -> Result<()> {
    if hadr.control_plane_ha == ControlPlaneHa::Managed && !managed {
        return Err(SizingError::invalid(
            format!("{}.control_plane_ha", field),
            "managed control plane requires a managed distribution",
        ));
    }

    if !managed && hadr.control_plane_ha.is_highly_available() {
        let nodes = hadr.control_plane_nodes;
        if nodes > MAX_CONTROL_PLANE_NODES || nodes % 2 == 0 {
            return Err(SizingError::invalid(
                format!("{}.control_plane_nodes", field),
                format!(
                    "etcd quorum needs an odd member count of at most {}",
                    MAX_CONTROL_PLANE_NODES
                ),
            ));
        }
    }

    Ok(())
}

pub fn validate_vm_input(input: &VmSizingInput) -> Result<()> {
    if !input.environments.iter().any(|env| env.enabled) {
        return Err(SizingError::invalid(
            "environments",
            "at least one environment must be enabled",
        ));
    }

    let mut seen = HashSet::new();
    for (index, env) in input.environments.iter().enumerate() {
        if !seen.insert(env.environment) {
            return Err(SizingError::invalid(
                format!("environments[{}].environment", index),
                format!("{} is configured more than once", env.environment),
            ));
        }
        if !env.enabled {
            continue;
        }
        if env.roles.is_empty() {
            return Err(SizingError::invalid(
                format!("environments[{}].roles", index),
                "an enabled environment needs at least one role",
            ));
        }
        if env.storage_gb_per_vm == 0 {
            return Err(SizingError::invalid(
                format!("environments[{}].storage_gb_per_vm", index),
                "must be positive",
            ));
        }
        if let VmDrPattern::MultiRegion { extra_regions } = env.dr_pattern {
            if extra_regions == 0 || extra_regions > MAX_DR_REGIONS {
                return Err(SizingError::invalid(
                    format!("environments[{}].dr_pattern.extra_regions", index),
                    format!("multi-region DR needs between 1 and {} extra regions", MAX_DR_REGIONS),
                ));
            }
        }
    }

    check_vm_demand("", input, 1.0)
}

pub fn validate_growth_settings(settings: &GrowthSettings) -> Result<()> {
    if settings.projection_years == 0 || settings.projection_years > MAX_PROJECTION_YEARS {
        return Err(SizingError::invalid(
            "projection_years",
            format!("must be between 1 and {}", MAX_PROJECTION_YEARS),
        ));
    }

    check_rate("annual_growth_rate", settings.annual_growth_rate)?;
    check_rate("cost_inflation_rate", settings.cost_inflation_rate)?;

    if settings.pattern == GrowthPattern::Custom {
        for (year, rate) in &settings.custom_rates {
            if *year == 0 || *year > settings.projection_years {
                return Err(SizingError::invalid(
                    "custom_rates",
                    format!("year {} is outside 1..={}", year, settings.projection_years),
                ));
            }
            check_rate(&format!("custom_rates.{}", year), *rate)?;
        }
    }

    let limits = &settings.limits;
    if limits.max_nodes_per_cluster == 0
        || limits.max_pods_per_cluster == 0
        || limits.max_pods_per_node == 0
    {
        return Err(SizingError::invalid("limits", "cluster limits must be positive"));
    }

    Ok(())
}

/// Checks the baseline input, the projection settings, and that the
/// baseline stays within the `MAX_*` bounds in every projected year
pub fn validate_growth_request(catalog: &SizingCatalog, request: &GrowthRequest) -> Result<()> {
    match &request.baseline {
        GrowthBaseline::K8s(input) => validate_k8s_input(catalog, input)?,
        GrowthBaseline::Vm(input) => validate_vm_input(input)?,
        GrowthBaseline::Metrics(_) => {}
    }
    validate_growth_settings(&request.settings)?;

    let peak = peak_growth_factor(&request.settings);
    match &request.baseline {
        GrowthBaseline::K8s(input) => check_k8s_demand("baseline.k8s.", input, peak),
        GrowthBaseline::Vm(input) => check_vm_demand("baseline.vm.", input, peak),
        GrowthBaseline::Metrics(metrics) => check_metrics(metrics, peak),
    }
}

/// Largest growth factor over the projection, never below the baseline
pub fn peak_growth_factor(settings: &GrowthSettings) -> f64 {
    (0..=settings.projection_years)
        .map(|year| growth_factor(settings, year))
        .fold(1.0, f64::max)
}

fn check_bound(field: String, what: &str, value: f64, maximum: u64) -> Result<()> {
    if !value.is_finite() || value > maximum as f64 {
        return Err(SizingError::invalid(
            field,
            format!("{} reach {:.0}, above the supported maximum of {}", what, value, maximum),
        ));
    }
    Ok(())
}

/// Apps and pods of `input` with every pool scaled by `factor`
fn check_k8s_demand(prefix: &str, input: &K8sSizingInput, factor: f64) -> Result<()> {
    let pool_pods = |production: bool| -> f64 {
        EnvironmentType::ALL
            .iter()
            .filter(|env| input.environments.contains(*env) && env.is_production() == production)
            .map(|env| input.apps_for(*env).total() as f64 * input.replicas_for(*env) as f64)
            .sum::<f64>()
            * factor
    };

    for (pool, apps, production) in [
        ("prod_apps", input.prod_apps, true),
        ("non_prod_apps", input.non_prod_apps, false),
    ] {
        check_bound(format!("{}{}", prefix, pool), "apps", apps.total() as f64 * factor, MAX_APPS)?;
        check_bound(format!("{}{}", prefix, pool), "pods", pool_pods(production), MAX_PODS)?;
    }

    check_bound(
        format!("{}environments", prefix),
        "pods",
        pool_pods(true) + pool_pods(false),
        MAX_PODS,
    )
}

/// Worst-case VM count of `input` with every role scaled by `factor`
fn check_vm_demand(prefix: &str, input: &VmSizingInput, factor: f64) -> Result<()> {
    let vms: f64 = input
        .environments
        .iter()
        .filter(|env| env.enabled)
        .map(|env| {
            let instances: f64 = env.roles.iter().map(|r| r.instances as f64 * factor).sum();
            // N+2 standbys per role
            let primary = instances + 2.0 * env.roles.len() as f64;
            primary * (1.0 + dr_fraction(env.dr_pattern))
        })
        .sum();
    check_bound(format!("{}environments", prefix), "VMs", vms, MAX_NODES)
}

fn check_metrics(metrics: &BaselineMetrics, factor: f64) -> Result<()> {
    check_bound("baseline.metrics.apps".to_string(), "apps", metrics.apps as f64 * factor, MAX_APPS)?;
    check_bound("baseline.metrics.pods".to_string(), "pods", metrics.pods as f64 * factor, MAX_PODS)?;
    check_bound(
        "baseline.metrics.nodes".to_string(),
        "nodes",
        metrics.nodes as f64 * factor,
        MAX_NODES,
    )
}

/// Rates are percentages; anything at or below -100% erases the baseline
fn check_rate(field: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= -100.0 || rate > 1000.0 {
        return Err(SizingError::invalid(field, "must be above -100% and at most 1000%"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Distribution, ServerRole};
    use crate::models::{AppConfig, AppTier, EnvironmentType, Technology};
    use crate::vm::{VmEnvironmentConfig, VmRoleConfig};
    use std::collections::BTreeMap;

    fn k8s_input(distribution: Distribution) -> K8sSizingInput {
        K8sSizingInput::new(distribution, Technology::Java)
            .with_environments(&[EnvironmentType::Dev, EnvironmentType::Prod])
            .with_apps(AppConfig::new(5, 5, 0, 0), AppConfig::new(5, 5, 0, 0))
    }

    fn field_of(err: SizingError) -> String {
        match err {
            SizingError::InvalidInput { field, .. } => field,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_defaults_pass() {
        let catalog = SizingCatalog::builtin();
        for distribution in Distribution::ALL {
            let mut input = k8s_input(distribution);
            if catalog.distribution(distribution).unwrap().has_managed_control_plane {
                input.hadr.control_plane_ha = ControlPlaneHa::Managed;
            }
            assert!(validate_k8s_input(&catalog, &input).is_ok(), "{}", distribution);
        }
    }

    #[test]
    fn test_managed_control_plane_on_self_managed_rejected() {
        let catalog = SizingCatalog::builtin();
        let mut input = k8s_input(Distribution::OpenShift);
        input.hadr.control_plane_ha = ControlPlaneHa::Managed;
        let err = validate_k8s_input(&catalog, &input).unwrap_err();
        assert_eq!(field_of(err), "hadr.control_plane_ha");

        let mut input = k8s_input(Distribution::Kubernetes);
        input.non_prod_hadr = Some(K8sHaDrConfig {
            control_plane_ha: ControlPlaneHa::Managed,
            ..K8sHaDrConfig::default()
        });
        let err = validate_k8s_input(&catalog, &input).unwrap_err();
        assert_eq!(field_of(err), "non_prod_hadr.control_plane_ha");
    }

    #[test]
    fn test_even_control_plane_rejected() {
        let catalog = SizingCatalog::builtin();
        let mut input = k8s_input(Distribution::Kubernetes);
        input.hadr.control_plane_nodes = 4;
        let err = validate_k8s_input(&catalog, &input).unwrap_err();
        assert_eq!(field_of(err), "hadr.control_plane_nodes");

        input.hadr.control_plane_nodes = 5;
        assert!(validate_k8s_input(&catalog, &input).is_ok());
    }

    #[test]
    fn test_k8s_field_rules() {
        let catalog = SizingCatalog::builtin();

        let mut input = k8s_input(Distribution::Kubernetes);
        input.environments.clear();
        assert_eq!(field_of(validate_k8s_input(&catalog, &input).unwrap_err()), "environments");

        let mut input = k8s_input(Distribution::Kubernetes);
        input.replicas.prod = 0;
        assert_eq!(field_of(validate_k8s_input(&catalog, &input).unwrap_err()), "replicas.prod");

        let mut input = k8s_input(Distribution::Kubernetes);
        input.headroom.non_prod = -5.0;
        assert_eq!(
            field_of(validate_k8s_input(&catalog, &input).unwrap_err()),
            "headroom.non_prod"
        );

        let mut input = k8s_input(Distribution::Kubernetes);
        input.overcommit.prod.memory = 0.5;
        assert_eq!(
            field_of(validate_k8s_input(&catalog, &input).unwrap_err()),
            "overcommit.prod.memory"
        );

        let mut input = k8s_input(Distribution::Kubernetes).with_mode(ClusterMode::PerEnvironment);
        input.selected_environment = Some(EnvironmentType::Stage);
        assert_eq!(
            field_of(validate_k8s_input(&catalog, &input).unwrap_err()),
            "selected_environment"
        );
    }

    #[test]
    fn test_missing_distribution_is_lookup_error() {
        let catalog = SizingCatalog::empty();
        let err = validate_k8s_input(&catalog, &k8s_input(Distribution::Gke)).unwrap_err();
        assert!(!err.is_validation());
    }

    #[test]
    fn test_vm_rules() {
        let role = VmRoleConfig::new(ServerRole::Web, 2, AppTier::Small);
        let prod = VmEnvironmentConfig::new(EnvironmentType::Prod, vec![role]);
        let valid = VmSizingInput {
            technology: Technology::Go,
            environments: vec![prod.clone()],
        };
        assert!(validate_vm_input(&valid).is_ok());

        let duplicate = VmSizingInput {
            technology: Technology::Go,
            environments: vec![prod.clone(), prod.clone()],
        };
        assert_eq!(
            field_of(validate_vm_input(&duplicate).unwrap_err()),
            "environments[1].environment"
        );

        let no_regions = VmSizingInput {
            technology: Technology::Go,
            environments: vec![prod.clone().with_dr(VmDrPattern::MultiRegion { extra_regions: 0 })],
        };
        assert_eq!(
            field_of(validate_vm_input(&no_regions).unwrap_err()),
            "environments[0].dr_pattern.extra_regions"
        );

        let mut disabled = prod;
        disabled.enabled = false;
        let nothing = VmSizingInput {
            technology: Technology::Go,
            environments: vec![disabled],
        };
        assert_eq!(field_of(validate_vm_input(&nothing).unwrap_err()), "environments");
    }

    #[test]
    fn test_growth_rules() {
        assert!(validate_growth_settings(&GrowthSettings::default()).is_ok());

        let zero_years = GrowthSettings {
            projection_years: 0,
            ..GrowthSettings::default()
        };
        assert_eq!(
            field_of(validate_growth_settings(&zero_years).unwrap_err()),
            "projection_years"
        );

        let collapse = GrowthSettings {
            annual_growth_rate: -100.0,
            ..GrowthSettings::default()
        };
        assert_eq!(
            field_of(validate_growth_settings(&collapse).unwrap_err()),
            "annual_growth_rate"
        );

        let custom = GrowthSettings {
            pattern: GrowthPattern::Custom,
            projection_years: 3,
            custom_rates: BTreeMap::from([(5, 10.0)]),
            ..GrowthSettings::default()
        };
        assert_eq!(field_of(validate_growth_settings(&custom).unwrap_err()), "custom_rates");
    }

    #[test]
    fn test_growth_request_checks_baseline_first() {
        let catalog = SizingCatalog::builtin();
        let mut input = k8s_input(Distribution::Kubernetes);
        input.environments.clear();

        let request = GrowthRequest {
            baseline: GrowthBaseline::K8s(input),
            settings: GrowthSettings {
                projection_years: 0,
                ..GrowthSettings::default()
            },
            cost_model: None,
        };
        assert_eq!(
            field_of(validate_growth_request(&catalog, &request).unwrap_err()),
            "environments"
        );

        let metrics = GrowthRequest {
            baseline: GrowthBaseline::Metrics(Default::default()),
            settings: GrowthSettings::default(),
            cost_model: None,
        };
        assert!(validate_growth_request(&catalog, &metrics).is_ok());
    }

    fn reference_request(pattern: GrowthPattern, rate: f64, years: u32) -> GrowthRequest {
        let apps = AppConfig::new(0, 70, 0, 0);
        let input = K8sSizingInput::new(Distribution::Kubernetes, Technology::DotNet)
            .with_environments(&[EnvironmentType::Dev, EnvironmentType::Test, EnvironmentType::Prod])
            .with_apps(apps, apps);
        GrowthRequest {
            baseline: GrowthBaseline::K8s(input),
            settings: GrowthSettings {
                annual_growth_rate: rate,
                projection_years: years,
                pattern,
                ..GrowthSettings::default()
            },
            cost_model: None,
        }
    }

    #[test]
    fn test_growth_extremes_rejected() {
        let catalog = SizingCatalog::builtin();

        let steady = reference_request(GrowthPattern::Exponential, 20.0, 5);
        assert!(validate_growth_request(&catalog, &steady).is_ok());

        // 6^10 growth on 70 apps per pool
        let runaway = reference_request(GrowthPattern::Exponential, 500.0, MAX_PROJECTION_YEARS);
        let field = field_of(validate_growth_request(&catalog, &runaway).unwrap_err());
        assert_eq!(field, "baseline.k8s.prod_apps");

        let mut custom = reference_request(GrowthPattern::Custom, 0.0, 7);
        custom.settings.custom_rates = BTreeMap::from([(1, 1000.0)]);
        assert!(validate_growth_request(&catalog, &custom).is_err());
    }

    #[test]
    fn test_peak_factor_covers_shrinking_projections() {
        let shrink = GrowthSettings {
            annual_growth_rate: -50.0,
            pattern: GrowthPattern::Linear,
            ..GrowthSettings::default()
        };
        assert_eq!(peak_growth_factor(&shrink), 1.0);

        let exponential = GrowthSettings {
            annual_growth_rate: 100.0,
            projection_years: 3,
            pattern: GrowthPattern::Exponential,
            ..GrowthSettings::default()
        };
        assert!((peak_growth_factor(&exponential) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_baseline_bounded() {
        let catalog = SizingCatalog::builtin();
        let request = |pods: u32| GrowthRequest {
            baseline: GrowthBaseline::Metrics(BaselineMetrics {
                apps: 1000,
                pods,
                nodes: 3000,
                ..Default::default()
            }),
            settings: GrowthSettings {
                annual_growth_rate: 20.0,
                projection_years: 5,
                pattern: GrowthPattern::Exponential,
                ..GrowthSettings::default()
            },
            cost_model: None,
        };

        assert!(validate_growth_request(&catalog, &request(60_000)).is_ok());
        assert_eq!(
            field_of(validate_growth_request(&catalog, &request(5_000_000)).unwrap_err()),
            "baseline.metrics.pods"
        );
    }

    #[test]
    fn test_oversized_inputs_rejected_without_growth() {
        let catalog = SizingCatalog::builtin();
        let mut input = k8s_input(Distribution::Kubernetes);
        input.non_prod_apps = AppConfig::new(u32::MAX, u32::MAX, 0, 0);
        assert_eq!(field_of(validate_k8s_input(&catalog, &input).unwrap_err()), "non_prod_apps");

        let role = VmRoleConfig::new(ServerRole::Web, 2, AppTier::Small);
        let regions = VmSizingInput {
            technology: Technology::Go,
            environments: vec![VmEnvironmentConfig::new(EnvironmentType::Prod, vec![role])
                .with_dr(VmDrPattern::MultiRegion { extra_regions: MAX_DR_REGIONS + 1 })],
        };
        assert_eq!(
            field_of(validate_vm_input(&regions).unwrap_err()),
            "environments[0].dr_pattern.extra_regions"
        );
    }
}
