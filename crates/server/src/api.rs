//! HTTP API for sizing calculations, previews, health checks and Prometheus metrics

use crate::health::{ComponentStatus, HealthRegistry};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use sizing_lib::{
    calculate_k8s, calculate_vm,
    catalog::{LoadBalancerSpecs, RoleSpecs},
    hadr::MultiplierBreakdown,
    project_growth, validation,
    vm::{ha_multiplier, HaPattern},
    AppTier, CalculationKind, CostModel, CostModelKind, Distribution, GrowthProjection,
    GrowthRequest, K8sHaDrConfig, K8sSizingInput, K8sSizingResult, LoadBalancerOption,
    ServerRole, SizingCatalog, SizingError, SizingMetrics, StructuredLogger, Technology,
    VmSizingInput, VmSizingResult,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<SizingCatalog>,
    pub cost_model: CostModelKind,
    pub health_registry: HealthRegistry,
    pub metrics: SizingMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(
        catalog: SizingCatalog,
        cost_model: CostModelKind,
        health_registry: HealthRegistry,
        metrics: SizingMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            cost_model,
            health_registry,
            metrics,
            logger,
        }
    }
}

/// Error body returned for rejected or failed calculations
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A failed calculation, tagged with the endpoint it came from
pub struct ApiError {
    kind: CalculationKind,
    error: SizingError,
    /// Set when axum refused the body before it reached validation
    status: Option<StatusCode>,
}

impl ApiError {
    fn new(kind: CalculationKind, error: SizingError) -> Self {
        Self {
            kind,
            error,
            status: None,
        }
    }

    fn rejected(kind: CalculationKind, rejection: JsonRejection) -> Self {
        Self {
            kind,
            error: SizingError::invalid("body", rejection.body_text()),
            status: Some(rejection.status()),
        }
    }

    fn record(self, state: &AppState) -> Self {
        match &self.error {
            SizingError::InvalidInput { field, reason } => {
                state.metrics.inc_validation_failures(self.kind);
                state.logger.log_validation_failure(self.kind, field, reason);
            }
            SizingError::NotFound { .. } | SizingError::InvalidCatalog { .. } => {
                state.metrics.inc_lookup_failures(self.kind);
                state
                    .logger
                    .log_lookup_failure(self.kind, &self.error.to_string());
            }
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (derived, field) = match &self.error {
            SizingError::InvalidInput { field, .. } => (StatusCode::BAD_REQUEST, Some(field.clone())),
            // Catalog defects belong to the deployment, not the request
            SizingError::NotFound { .. } | SizingError::InvalidCatalog { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };
        let status = self.status.unwrap_or(derived);
        let body = ErrorBody {
            error: self.error.to_string(),
            field,
        };
        (status, Json(body)).into_response()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

async fn calculate_k8s_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<K8sSizingInput>, JsonRejection>,
) -> Result<Json<K8sSizingResult>, ApiError> {
    let kind = CalculationKind::K8s;
    let start = Instant::now();
    let Json(input) = body.map_err(|e| ApiError::rejected(kind, e).record(&state))?;

    let result = validation::validate_k8s_input(&state.catalog, &input)
        .and_then(|_| calculate_k8s(&state.catalog, &input))
        .map_err(|e| ApiError::new(kind, e).record(&state))?;

    state.metrics.observe_calculation(
        kind,
        start.elapsed().as_secs_f64(),
        result.grand_total.total_nodes,
    );
    state.logger.log_k8s_calculation(&result, elapsed_ms(start));

    Ok(Json(result))
}

async fn calculate_vm_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VmSizingInput>, JsonRejection>,
) -> Result<Json<VmSizingResult>, ApiError> {
    let kind = CalculationKind::Vm;
    let start = Instant::now();
    let Json(input) = body.map_err(|e| ApiError::rejected(kind, e).record(&state))?;

    let result = validation::validate_vm_input(&input)
        .and_then(|_| calculate_vm(&state.catalog, &input))
        .map_err(|e| ApiError::new(kind, e).record(&state))?;

    state.metrics.observe_calculation(
        kind,
        start.elapsed().as_secs_f64(),
        result.grand_total.total_vms,
    );
    state.logger.log_vm_calculation(&result, elapsed_ms(start));

    Ok(Json(result))
}

async fn project_growth_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GrowthRequest>, JsonRejection>,
) -> Result<Json<GrowthProjection>, ApiError> {
    let kind = CalculationKind::Growth;
    let start = Instant::now();
    let Json(request) = body.map_err(|e| ApiError::rejected(kind, e).record(&state))?;
    let cost_model: Box<dyn CostModel> = request.cost_model.unwrap_or(state.cost_model).build();

    let projection = validation::validate_growth_request(&state.catalog, &request)
        .and_then(|_| {
            project_growth(
                &state.catalog,
                &request.baseline,
                &request.settings,
                cost_model.as_ref(),
            )
        })
        .map_err(|e| ApiError::new(kind, e).record(&state))?;

    state.metrics.observe_calculation(
        kind,
        start.elapsed().as_secs_f64(),
        projection.summary.final_nodes,
    );
    state.logger.log_growth_projection(&projection, elapsed_ms(start));

    Ok(Json(projection))
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: ServerRole,
    pub tier: AppTier,
    pub technology: Technology,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RolePreview {
    pub role: ServerRole,
    pub tier: AppTier,
    pub technology: Technology,
    #[serde(flatten)]
    pub specs: RoleSpecs,
}

async fn preview_role(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<RolePreview>, ApiError> {
    let specs = state
        .catalog
        .role_specs(query.role, query.tier, query.technology)
        .map_err(|e| ApiError::new(CalculationKind::Vm, e).record(&state))?;

    Ok(Json(RolePreview {
        role: query.role,
        tier: query.tier,
        technology: query.technology,
        specs,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HaQuery {
    pub pattern: HaPattern,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HaPreview {
    pub pattern: HaPattern,
    pub multiplier: f64,
}

async fn preview_ha_multiplier(Query(query): Query<HaQuery>) -> Json<HaPreview> {
    Json(HaPreview {
        pattern: query.pattern,
        multiplier: ha_multiplier(query.pattern),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoadBalancerQuery {
    pub option: LoadBalancerOption,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoadBalancerPreview {
    pub option: LoadBalancerOption,
    #[serde(flatten)]
    pub specs: LoadBalancerSpecs,
}

async fn preview_load_balancer(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoadBalancerQuery>,
) -> Result<Json<LoadBalancerPreview>, ApiError> {
    let specs = state
        .catalog
        .load_balancer_specs(query.option)
        .map_err(|e| ApiError::new(CalculationKind::Vm, e).record(&state))?;

    Ok(Json(LoadBalancerPreview {
        option: query.option,
        specs,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct K8sMultiplierRequest {
    pub distribution: Distribution,
    #[serde(default)]
    pub hadr: K8sHaDrConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct K8sMultiplierPreview {
    pub breakdown: MultiplierBreakdown,
    pub multiplier: f64,
    pub masters: u32,
}

async fn preview_k8s_multiplier(
    State(state): State<Arc<AppState>>,
    body: Result<Json<K8sMultiplierRequest>, JsonRejection>,
) -> Result<Json<K8sMultiplierPreview>, ApiError> {
    let Json(request) =
        body.map_err(|e| ApiError::rejected(CalculationKind::K8s, e).record(&state))?;
    let distribution = state
        .catalog
        .distribution(request.distribution)
        .map_err(|e| ApiError::new(CalculationKind::K8s, e).record(&state))?;
    let breakdown = request.hadr.breakdown(distribution);

    Ok(Json(K8sMultiplierPreview {
        breakdown,
        multiplier: breakdown.total(),
        masters: request.hadr.master_count(distribution),
    }))
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            e.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/k8s/calculate", post(calculate_k8s_handler))
        .route("/api/v1/vm/calculate", post(calculate_vm_handler))
        .route("/api/v1/growth/project", post(project_growth_handler))
        .route("/api/v1/preview/role", get(preview_role))
        .route("/api/v1/preview/ha-multiplier", get(preview_ha_multiplier))
        .route("/api/v1/preview/load-balancer", get(preview_load_balancer))
        .route("/api/v1/preview/k8s-multiplier", post(preview_k8s_multiplier))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve(
    port: u16,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
