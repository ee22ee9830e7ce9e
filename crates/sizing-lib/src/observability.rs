//! Observability infrastructure for the sizing engines
//!
//! Provides:
//! - Prometheus metrics (calculation latency, calculation and validation counters, node gauge)
//! - Structured JSON logging with tracing

use crate::growth::GrowthProjection;
use crate::k8s::K8sSizingResult;
use crate::vm::VmSizingResult;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for calculation latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<SizingMetricsInner> = OnceLock::new();

/// Calculation label used on every metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationKind {
    K8s,
    Vm,
    Growth,
}

impl CalculationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationKind::K8s => "k8s",
            CalculationKind::Vm => "vm",
            CalculationKind::Growth => "growth",
        }
    }
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct SizingMetricsInner {
    calculation_duration_seconds: HistogramVec,
    calculations_total: IntCounterVec,
    validation_failures_total: IntCounterVec,
    lookup_failures_total: IntCounterVec,
    last_total_nodes: IntGaugeVec,
}

impl SizingMetricsInner {
    fn new() -> Self {
        Self {
            calculation_duration_seconds: register_histogram_vec!(
                "sizing_calculation_duration_seconds",
                "Time spent in a sizing or projection calculation",
                &["kind"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register calculation_duration_seconds"),

            calculations_total: register_int_counter_vec!(
                "sizing_calculations_total",
                "Total number of completed calculations",
                &["kind"]
            )
            .expect("Failed to register calculations_total"),

            validation_failures_total: register_int_counter_vec!(
                "sizing_validation_failures_total",
                "Total number of requests rejected by input validation",
                &["kind"]
            )
            .expect("Failed to register validation_failures_total"),

            lookup_failures_total: register_int_counter_vec!(
                "sizing_lookup_failures_total",
                "Total number of calculations failed by a missing catalog entry",
                &["kind"]
            )
            .expect("Failed to register lookup_failures_total"),

            last_total_nodes: register_int_gauge_vec!(
                "sizing_last_total_nodes",
                "Grand total nodes (or VMs) of the most recent calculation",
                &["kind"]
            )
            .expect("Failed to register last_total_nodes"),
        }
    }
}

/// Sizing metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct SizingMetrics {
    _private: (),
}

impl Default for SizingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SizingMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(SizingMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &SizingMetricsInner {
        GLOBAL_METRICS.get_or_init(SizingMetricsInner::new)
    }

    /// Record a completed calculation
    pub fn observe_calculation(&self, kind: CalculationKind, duration_secs: f64, total_nodes: u32) {
        let label = [kind.as_str()];
        self.inner()
            .calculation_duration_seconds
            .with_label_values(&label)
            .observe(duration_secs);
        self.inner().calculations_total.with_label_values(&label).inc();
        self.inner()
            .last_total_nodes
            .with_label_values(&label)
            .set(total_nodes as i64);
    }

    pub fn inc_validation_failures(&self, kind: CalculationKind) {
        self.inner()
            .validation_failures_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn inc_lookup_failures(&self, kind: CalculationKind) {
        self.inner()
            .lookup_failures_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn calculations(&self, kind: CalculationKind) -> u64 {
        self.inner()
            .calculations_total
            .with_label_values(&[kind.as_str()])
            .get()
    }

    pub fn validation_failures(&self, kind: CalculationKind) -> u64 {
        self.inner()
            .validation_failures_total
            .with_label_values(&[kind.as_str()])
            .get()
    }
}

/// Structured logger for calculation events
///
/// One event per calculation with the headline numbers, so a JSON log
/// pipeline can chart sizing requests without parsing bodies.
#[derive(Clone)]
pub struct StructuredLogger {
    service: String,
}

impl StructuredLogger {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn log_k8s_calculation(&self, result: &K8sSizingResult, duration_ms: f64) {
        let total = &result.grand_total;
        info!(
            event = "k8s_sizing_calculated",
            service = %self.service,
            distribution = %result.distribution,
            technology = %result.technology,
            cluster_mode = ?result.cluster_mode,
            clusters = total.clusters,
            apps = total.apps,
            pods = total.pods,
            masters = total.masters,
            infra_nodes = total.infra_nodes,
            workers = total.workers,
            total_nodes = total.total_nodes,
            cpu_cores = total.resources.cpu_cores,
            ram_gb = total.resources.ram_gb,
            storage_gb = total.resources.storage_gb,
            duration_ms = duration_ms,
            "Kubernetes sizing calculated"
        );
    }

    pub fn log_vm_calculation(&self, result: &VmSizingResult, duration_ms: f64) {
        let total = &result.grand_total;
        info!(
            event = "vm_sizing_calculated",
            service = %self.service,
            technology = %result.technology,
            environments = total.environments,
            primary_vms = total.primary_vms,
            dr_vms = total.dr_vms,
            total_vms = total.total_vms,
            cpu_cores = total.resources.cpu_cores,
            ram_gb = total.resources.ram_gb,
            storage_gb = total.resources.storage_gb,
            duration_ms = duration_ms,
            "VM sizing calculated"
        );
    }

    pub fn log_growth_projection(&self, projection: &GrowthProjection, duration_ms: f64) {
        let summary = &projection.summary;
        if summary.critical_count > 0 {
            warn!(
                event = "growth_projected",
                service = %self.service,
                baseline = %projection.baseline_kind,
                years = projection.settings.projection_years,
                baseline_nodes = summary.baseline_nodes,
                final_nodes = summary.final_nodes,
                critical_count = summary.critical_count,
                first_critical_year = ?summary.first_critical_year,
                duration_ms = duration_ms,
                "Growth projection exceeds cluster limits"
            );
        } else {
            info!(
                event = "growth_projected",
                service = %self.service,
                baseline = %projection.baseline_kind,
                years = projection.settings.projection_years,
                baseline_nodes = summary.baseline_nodes,
                final_nodes = summary.final_nodes,
                warning_count = summary.warning_count,
                total_cost = summary.total_cost,
                duration_ms = duration_ms,
                "Growth projection calculated"
            );
        }
    }

    pub fn log_validation_failure(&self, kind: CalculationKind, field: &str, reason: &str) {
        info!(
            event = "validation_failed",
            service = %self.service,
            kind = %kind,
            field = %field,
            reason = %reason,
            "Sizing request rejected"
        );
    }

    pub fn log_lookup_failure(&self, kind: CalculationKind, error: &str) {
        warn!(
            event = "catalog_lookup_failed",
            service = %self.service,
            kind = %kind,
            error = %error,
            "Catalog is missing an entry"
        );
    }

    pub fn log_startup(&self, version: &str, catalog_source: &str, cost_model: &str) {
        info!(
            event = "service_started",
            service = %self.service,
            version = %version,
            catalog_source = %catalog_source,
            cost_model = %cost_model,
            "Sizing service started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service,
            reason = %reason,
            "Sizing service shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_metrics_shared_handles() {
        let metrics = SizingMetrics::new();
        let clone = metrics.clone();

        let before = metrics.calculations(CalculationKind::Vm);
        clone.observe_calculation(CalculationKind::Vm, 0.0002, 12);
        assert!(metrics.calculations(CalculationKind::Vm) > before);

        let before = metrics.validation_failures(CalculationKind::Growth);
        metrics.inc_validation_failures(CalculationKind::Growth);
        assert!(clone.validation_failures(CalculationKind::Growth) > before);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("sizing-server");
        assert_eq!(logger.service, "sizing-server");
    }
}
