//! Year-by-year projection driver

use super::curve::growth_factor;
use super::limits::{check_cluster, recommend, ClusterLimitWarning, Severity};
use super::{
    BaselineMetrics, ClusterLoad, GrowthBaseline, GrowthProjection, GrowthSettings,
    ProjectionPoint, ProjectionSummary,
};
use crate::catalog::SizingCatalog;
use crate::error::Result;
use crate::k8s::{calculate_k8s, K8sSizingInput};
use crate::models::{ceil_count, ResourceTotals};
use crate::pricing::{round_cost, CostModel};
use crate::vm::{calculate_vm, VmSizingInput};
use chrono::{Datelike, Utc};
use tracing::debug;

/// Footprint of one year before pricing
struct Footprint {
    apps: u32,
    pods: u32,
    nodes: u32,
    resources: ResourceTotals,
    clusters: Vec<ClusterLoad>,
}

/// Project `baseline` over `settings.projection_years` years.
///
/// Sizing-input baselines are re-sized every year with every tier or role
/// count scaled by the growth factor, so node counts step rather than
/// interpolate.
pub fn project_growth(
    catalog: &SizingCatalog,
    baseline: &GrowthBaseline,
    settings: &GrowthSettings,
    cost_model: &dyn CostModel,
) -> Result<GrowthProjection> {
    let start_year = settings.start_year.unwrap_or_else(|| Utc::now().year());

    let points = (0..=settings.projection_years)
        .map(|year| -> Result<ProjectionPoint> {
            let factor = growth_factor(settings, year);
            let footprint = match baseline {
                GrowthBaseline::K8s(input) => k8s_footprint(catalog, input, factor)?,
                GrowthBaseline::Vm(input) => vm_footprint(catalog, input, factor)?,
                GrowthBaseline::Metrics(metrics) => metrics_footprint(metrics, factor),
            };
            let inflation = (1.0 + settings.cost_inflation_rate / 100.0).powi(year as i32);
            let monthly_cost = round_cost(cost_model.monthly_cost(&footprint.resources) * inflation);

            debug!(
                year,
                factor,
                apps = footprint.apps,
                nodes = footprint.nodes,
                monthly_cost,
                "Projected year"
            );

            Ok(ProjectionPoint {
                year_index: year,
                calendar_year: start_year + year as i32,
                growth_factor: factor,
                projected_apps: footprint.apps,
                pods: footprint.pods,
                nodes: footprint.nodes,
                resources: footprint.resources,
                monthly_cost,
                clusters: footprint.clusters,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let warnings: Vec<ClusterLimitWarning> = points
        .iter()
        .flat_map(|point| {
            point
                .clusters
                .iter()
                .flat_map(move |cluster| check_cluster(&settings.limits, point, cluster))
        })
        .collect();

    let positive_growth = growth_factor(settings, settings.projection_years) > 1.0;
    let recommendations = recommend(&points, &warnings, positive_growth);
    let summary = summarize(&points, &warnings);
    let baseline_point = points[0].clone();

    Ok(GrowthProjection {
        baseline_kind: baseline.kind().to_string(),
        cost_model: cost_model.name().to_string(),
        settings: settings.clone(),
        baseline: baseline_point,
        points,
        warnings,
        recommendations,
        summary,
    })
}

fn k8s_footprint(catalog: &SizingCatalog, input: &K8sSizingInput, factor: f64) -> Result<Footprint> {
    let scaled = input.scaled(factor);
    let result = calculate_k8s(catalog, &scaled)?;

    let clusters = result
        .environments
        .iter()
        .map(|row| ClusterLoad {
            name: row.name.clone(),
            nodes: row.total_nodes,
            workers: row.workers,
            pods: row.pods,
        })
        .collect();

    Ok(Footprint {
        apps: scaled.prod_apps.total().saturating_add(scaled.non_prod_apps.total()),
        pods: result.grand_total.pods,
        nodes: result.grand_total.total_nodes,
        resources: result.grand_total.resources,
        clusters,
    })
}

fn vm_footprint(catalog: &SizingCatalog, input: &VmSizingInput, factor: f64) -> Result<Footprint> {
    let scaled = input.scaled(factor);
    let result = calculate_vm(catalog, &scaled)?;

    Ok(Footprint {
        apps: scaled.total_instances(),
        pods: 0,
        nodes: result.grand_total.total_vms,
        resources: result.grand_total.resources,
        clusters: Vec::new(),
    })
}

/// Scalar baselines scale proportionally; nodes round up
fn metrics_footprint(metrics: &BaselineMetrics, factor: f64) -> Footprint {
    let scale = |value: u32| (value as f64 * factor).round() as u32;
    let nodes = ceil_count(metrics.nodes as f64 * factor);
    let pods = scale(metrics.pods);

    Footprint {
        apps: scale(metrics.apps),
        pods,
        nodes,
        resources: metrics.resources.scaled_ceil(factor),
        clusters: vec![ClusterLoad {
            name: "baseline".to_string(),
            nodes,
            workers: nodes,
            pods,
        }],
    }
}

fn summarize(points: &[ProjectionPoint], warnings: &[ClusterLimitWarning]) -> ProjectionSummary {
    let first = &points[0];
    let last = &points[points.len() - 1];
    let years = last.year_index;

    let total_growth_percent = if first.projected_apps > 0 {
        (last.projected_apps as f64 / first.projected_apps as f64 - 1.0) * 100.0
    } else {
        0.0
    };

    let node_cagr_percent = if first.nodes > 0 && years > 0 {
        ((last.nodes as f64 / first.nodes as f64).powf(1.0 / years as f64) - 1.0) * 100.0
    } else {
        0.0
    };

    let total_cost = round_cost(points.iter().skip(1).map(|p| p.monthly_cost * 12.0).sum());
    let average_annual_cost = if years > 0 {
        round_cost(total_cost / years as f64)
    } else {
        0.0
    };

    let count = |severity: Severity| warnings.iter().filter(|w| w.severity == severity).count() as u32;

    ProjectionSummary {
        baseline_apps: first.projected_apps,
        final_apps: last.projected_apps,
        total_growth_percent,
        baseline_nodes: first.nodes,
        final_nodes: last.nodes,
        peak_nodes: points.iter().map(|p| p.nodes).max().unwrap_or(0),
        node_cagr_percent,
        total_cost,
        average_annual_cost,
        warning_count: count(Severity::Warning),
        critical_count: count(Severity::Critical),
        first_critical_year: warnings
            .iter()
            .filter(|w| w.severity == Severity::Critical)
            .map(|w| w.calendar_year)
            .min(),
    }
}
