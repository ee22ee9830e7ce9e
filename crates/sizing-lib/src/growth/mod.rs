//! Multi-year growth projection
//!
//! Extrapolates a sizing baseline year by year, re-running the sizing
//! engines so node counts step the way real clusters do, and flags
//! clusters approaching their scalability limits.

mod curve;
mod engine;
mod limits;

pub use curve::{growth_factor, rate_for_year};
pub use engine::project_growth;
pub use limits::{
    check_cluster, classify_utilization, recommend, ClusterLimitWarning, LimitKind, Priority,
    RecommendationKind, ScalingRecommendation, Severity,
};

use crate::k8s::K8sSizingInput;
use crate::models::ResourceTotals;
use crate::pricing::CostModelKind;
use crate::vm::VmSizingInput;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPattern {
    Linear,
    #[default]
    Exponential,
    #[serde(rename = "s_curve")]
    SCurve,
    /// Per-year rates from `custom_rates`
    Custom,
}

impl GrowthPattern {
    pub const ALL: [GrowthPattern; 4] = [
        GrowthPattern::Linear,
        GrowthPattern::Exponential,
        GrowthPattern::SCurve,
        GrowthPattern::Custom,
    ];
}

/// Upstream Kubernetes scalability thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterLimits {
    pub max_nodes_per_cluster: u32,
    pub max_pods_per_cluster: u32,
    pub max_pods_per_node: u32,
}

impl Default for ClusterLimits {
    fn default() -> Self {
        Self {
            max_nodes_per_cluster: 5000,
            max_pods_per_cluster: 150_000,
            max_pods_per_node: 110,
        }
    }
}

/// How the baseline grows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthSettings {
    /// Percent per year
    pub annual_growth_rate: f64,
    pub projection_years: u32,
    pub pattern: GrowthPattern,
    /// Percent per year applied to projected costs
    pub cost_inflation_rate: f64,
    /// Year index to percent, used by the custom pattern
    pub custom_rates: BTreeMap<u32, f64>,
    /// Calendar year of the baseline; the current year when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    pub limits: ClusterLimits,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            annual_growth_rate: 20.0,
            projection_years: 3,
            pattern: GrowthPattern::Exponential,
            cost_inflation_rate: 3.0,
            custom_rates: BTreeMap::new(),
            start_year: None,
            limits: ClusterLimits::default(),
        }
    }
}

/// Scalar footprint used when no sizing input is available
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineMetrics {
    pub apps: u32,
    pub pods: u32,
    pub nodes: u32,
    pub resources: ResourceTotals,
}

/// What a projection starts from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthBaseline {
    K8s(K8sSizingInput),
    Vm(VmSizingInput),
    Metrics(BaselineMetrics),
}

impl GrowthBaseline {
    pub fn kind(&self) -> &'static str {
        match self {
            GrowthBaseline::K8s(_) => "k8s",
            GrowthBaseline::Vm(_) => "vm",
            GrowthBaseline::Metrics(_) => "metrics",
        }
    }
}

/// A baseline plus the settings to project it with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRequest {
    pub baseline: GrowthBaseline,
    #[serde(default)]
    pub settings: GrowthSettings,
    /// Overrides the host's default cost model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_model: Option<CostModelKind>,
}

/// Load on one cluster in one projected year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLoad {
    pub name: String,
    pub nodes: u32,
    pub workers: u32,
    pub pods: u32,
}

/// Footprint in one projected year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// 0 for the baseline
    pub year_index: u32,
    pub calendar_year: i32,
    pub growth_factor: f64,
    pub projected_apps: u32,
    pub pods: u32,
    /// Cluster nodes, or VMs for a VM baseline
    pub nodes: u32,
    pub resources: ResourceTotals,
    pub monthly_cost: f64,
    /// Empty for VM baselines
    pub clusters: Vec<ClusterLoad>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub baseline_apps: u32,
    pub final_apps: u32,
    pub total_growth_percent: f64,
    pub baseline_nodes: u32,
    pub final_nodes: u32,
    pub peak_nodes: u32,
    /// Compound annual growth of the node count, in percent
    pub node_cagr_percent: f64,
    /// Cost of the projected years, baseline excluded
    pub total_cost: f64,
    pub average_annual_cost: f64,
    pub warning_count: u32,
    pub critical_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_critical_year: Option<i32>,
}

/// Result of a growth projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthProjection {
    pub baseline_kind: String,
    pub cost_model: String,
    pub settings: GrowthSettings,
    pub baseline: ProjectionPoint,
    /// One point per year; `points[0]` is the baseline
    pub points: Vec<ProjectionPoint>,
    pub warnings: Vec<ClusterLimitWarning>,
    pub recommendations: Vec<ScalingRecommendation>,
    pub summary: ProjectionSummary,
}

impl GrowthProjection {
    pub fn final_point(&self) -> &ProjectionPoint {
        self.points.last().unwrap_or(&self.baseline)
    }
}
