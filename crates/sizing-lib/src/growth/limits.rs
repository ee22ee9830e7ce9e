//! Cluster limit warnings and scaling recommendations

use super::{ClusterLimits, ClusterLoad, ProjectionPoint};
use serde::{Deserialize, Serialize};
use std::fmt;

const INFO_THRESHOLD: f64 = 0.6;
const WARNING_THRESHOLD: f64 = 0.8;
const CRITICAL_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    NodesPerCluster,
    PodsPerCluster,
    PodsPerNode,
}

impl LimitKind {
    /// Limits that only splitting the cluster resolves
    pub fn is_cluster_wide(&self) -> bool {
        matches!(self, LimitKind::NodesPerCluster | LimitKind::PodsPerCluster)
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::NodesPerCluster => write!(f, "nodes per cluster"),
            LimitKind::PodsPerCluster => write!(f, "pods per cluster"),
            LimitKind::PodsPerNode => write!(f, "pods per node"),
        }
    }
}

/// A cluster at or above 60% of one of its limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterLimitWarning {
    pub year_index: u32,
    pub calendar_year: i32,
    pub cluster: String,
    pub limit: LimitKind,
    pub current: f64,
    pub maximum: u32,
    pub utilization_percent: f64,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    SplitCluster,
    AddNodePool,
    IncreaseNodeSize,
    EnableAutoscaling,
    ReviewCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingRecommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    /// First year the recommendation applies to
    pub year_index: u32,
    pub calendar_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub message: String,
}

/// Severity of a utilization ratio (1.0 = at the limit)
pub fn classify_utilization(ratio: f64) -> Option<Severity> {
    if ratio >= CRITICAL_THRESHOLD {
        Some(Severity::Critical)
    } else if ratio >= WARNING_THRESHOLD {
        Some(Severity::Warning)
    } else if ratio >= INFO_THRESHOLD {
        Some(Severity::Info)
    } else {
        None
    }
}

/// Check one cluster in one year against every limit
pub fn check_cluster(
    limits: &ClusterLimits,
    point: &ProjectionPoint,
    cluster: &ClusterLoad,
) -> Vec<ClusterLimitWarning> {
    let mut checks = vec![
        (
            LimitKind::NodesPerCluster,
            cluster.nodes as f64,
            limits.max_nodes_per_cluster,
        ),
        (
            LimitKind::PodsPerCluster,
            cluster.pods as f64,
            limits.max_pods_per_cluster,
        ),
    ];
    if cluster.workers > 0 {
        checks.push((
            LimitKind::PodsPerNode,
            cluster.pods as f64 / cluster.workers as f64,
            limits.max_pods_per_node,
        ));
    }

    checks
        .into_iter()
        .filter(|(_, _, maximum)| *maximum > 0)
        .filter_map(|(limit, current, maximum)| {
            let ratio = current / maximum as f64;
            classify_utilization(ratio).map(|severity| ClusterLimitWarning {
                year_index: point.year_index,
                calendar_year: point.calendar_year,
                cluster: cluster.name.clone(),
                limit,
                current,
                maximum,
                utilization_percent: ratio * 100.0,
                severity,
                message: format!(
                    "{} cluster reaches {:.0}% of the {} limit ({:.0} of {}) in {}",
                    cluster.name,
                    ratio * 100.0,
                    limit,
                    current,
                    maximum,
                    point.calendar_year
                ),
            })
        })
        .collect()
}

/// Derive recommendations from the warnings and the node trajectory.
///
/// Each kind is emitted at most once, at the first year it triggers.
pub fn recommend(
    points: &[ProjectionPoint],
    warnings: &[ClusterLimitWarning],
    positive_growth: bool,
) -> Vec<ScalingRecommendation> {
    let mut recommendations = Vec::new();

    if let Some(w) = warnings
        .iter()
        .find(|w| w.limit.is_cluster_wide() && w.severity == Severity::Critical)
    {
        recommendations.push(from_warning(
            RecommendationKind::SplitCluster,
            Priority::High,
            w,
            format!(
                "Split the {} cluster before {}: {} exceeds the supported maximum",
                w.cluster, w.calendar_year, w.limit
            ),
        ));
    }

    if let Some(w) = warnings
        .iter()
        .find(|w| w.limit.is_cluster_wide() && w.severity == Severity::Warning)
    {
        recommendations.push(from_warning(
            RecommendationKind::AddNodePool,
            Priority::Medium,
            w,
            format!(
                "Plan an additional node pool or cluster for {} by {}",
                w.cluster, w.calendar_year
            ),
        ));
    }

    if let Some(w) = warnings
        .iter()
        .find(|w| w.limit == LimitKind::PodsPerNode && w.severity >= Severity::Warning)
    {
        recommendations.push(from_warning(
            RecommendationKind::IncreaseNodeSize,
            Priority::Medium,
            w,
            format!(
                "Pod density on {} nears the per-node limit in {}; use larger workers",
                w.cluster, w.calendar_year
            ),
        ));
    }

    if positive_growth {
        if let Some(first) = points.iter().find(|p| p.year_index == 1) {
            recommendations.push(ScalingRecommendation {
                kind: RecommendationKind::EnableAutoscaling,
                priority: Priority::Low,
                year_index: first.year_index,
                calendar_year: first.calendar_year,
                cluster: None,
                message: "Enable cluster autoscaling to absorb steady growth".to_string(),
            });
        }
    }

    if let (Some(baseline), Some(last)) = (points.first(), points.last()) {
        if baseline.nodes > 0 && last.nodes >= baseline.nodes.saturating_mul(2) {
            recommendations.push(ScalingRecommendation {
                kind: RecommendationKind::ReviewCapacity,
                priority: Priority::Low,
                year_index: last.year_index,
                calendar_year: last.calendar_year,
                cluster: None,
                message: format!(
                    "Footprint grows from {} to {} nodes by {}; review capacity plans",
                    baseline.nodes, last.nodes, last.calendar_year
                ),
            });
        }
    }

    recommendations.sort_by(|a, b| {
        a.year_index
            .cmp(&b.year_index)
            .then_with(|| b.priority.cmp(&a.priority))
    });
    recommendations
}

fn from_warning(
    kind: RecommendationKind,
    priority: Priority,
    warning: &ClusterLimitWarning,
    message: String,
) -> ScalingRecommendation {
    ScalingRecommendation {
        kind,
        priority,
        year_index: warning.year_index,
        calendar_year: warning.calendar_year,
        cluster: Some(warning.cluster.clone()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceTotals;

    fn point(year_index: u32, nodes: u32) -> ProjectionPoint {
        ProjectionPoint {
            year_index,
            calendar_year: 2030 + year_index as i32,
            growth_factor: 1.0,
            projected_apps: 0,
            pods: 0,
            nodes,
            resources: ResourceTotals::ZERO,
            monthly_cost: 0.0,
            clusters: Vec::new(),
        }
    }

    fn load(nodes: u32, workers: u32, pods: u32) -> ClusterLoad {
        ClusterLoad {
            name: "prod".to_string(),
            nodes,
            workers,
            pods,
        }
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify_utilization(0.59), None);
        assert_eq!(classify_utilization(0.6), Some(Severity::Info));
        assert_eq!(classify_utilization(0.8), Some(Severity::Warning));
        assert_eq!(classify_utilization(1.0), Some(Severity::Critical));
        assert_eq!(classify_utilization(1.7), Some(Severity::Critical));
    }

    #[test]
    fn test_check_cluster_limits() {
        let limits = ClusterLimits::default();
        let warnings = check_cluster(&limits, &point(2, 0), &load(4200, 4000, 20_000));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].limit, LimitKind::NodesPerCluster);
        assert_eq!(warnings[0].severity, Severity::Warning);
        assert_eq!(warnings[0].calendar_year, 2032);

        // 100 pods per worker is above 80% of 110
        let dense = check_cluster(&limits, &point(1, 0), &load(13, 10, 1000));
        assert_eq!(dense.len(), 1);
        assert_eq!(dense[0].limit, LimitKind::PodsPerNode);
        assert_eq!(dense[0].severity, Severity::Warning);
    }

    #[test]
    fn test_no_pods_per_node_check_without_workers() {
        let warnings = check_cluster(&ClusterLimits::default(), &point(0, 0), &load(3, 0, 0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_recommendations_first_trigger_only() {
        let limits = ClusterLimits::default();
        let points = vec![point(0, 3000), point(1, 4100), point(2, 5200), point(3, 6500)];
        let warnings: Vec<_> = points
            .iter()
            .flat_map(|p| check_cluster(&limits, p, &load(p.nodes, p.nodes, 0)))
            .collect();

        let recs = recommend(&points, &warnings, true);
        let kinds: Vec<_> = recs.iter().map(|r| (r.kind, r.year_index)).collect();
        assert_eq!(
            kinds,
            vec![
                (RecommendationKind::AddNodePool, 1),
                (RecommendationKind::EnableAutoscaling, 1),
                (RecommendationKind::SplitCluster, 2),
                (RecommendationKind::ReviewCapacity, 3),
            ]
        );
        assert_eq!(recs[2].priority, Priority::High);
    }

    #[test]
    fn test_no_growth_no_recommendations() {
        let points = vec![point(0, 10), point(1, 10)];
        assert!(recommend(&points, &[], false).is_empty());
    }
}
