//! Kubernetes sizing algorithm

use super::{
    ClusterMode, DemandSummary, K8sEnvironmentResult, K8sGrandTotal, K8sSizingInput,
    K8sSizingResult, OvercommitRatio,
};
use crate::catalog::{DistributionConfig, SizingCatalog};
use crate::error::{Result, SizingError};
use crate::hadr::{K8sHaDrConfig, NodeDistribution};
use crate::models::{ceil_count, ceil_whole, AppConfig, AppTier, EnvironmentType, NodeSpecs};
use tracing::debug;

/// Minimum workers for a cluster with any application demand
pub const MIN_WORKERS: u32 = 1;

/// Dedicated infra pool size per region (router, registry, monitoring)
pub const INFRA_POOL_NODES: u32 = 3;

/// Name of the single row produced in shared cluster mode
const SHARED_CLUSTER_NAME: &str = "shared";

/// What one cluster has to host and under which settings
struct ClusterPlan<'a> {
    name: String,
    environments: Vec<EnvironmentType>,
    production: bool,
    /// App pool and replica count per hosted environment
    workloads: Vec<(AppConfig, u32)>,
    headroom_percent: f64,
    overcommit: OvercommitRatio,
    hadr: &'a K8sHaDrConfig,
}

/// Size the Kubernetes footprint for `input`.
///
/// Pure function of its arguments: the only failures are a missing catalog
/// entry and a distribution whose workers have no capacity.
pub fn calculate_k8s(catalog: &SizingCatalog, input: &K8sSizingInput) -> Result<K8sSizingResult> {
    let distribution = catalog.distribution(input.distribution)?;

    let plans: Vec<ClusterPlan<'_>> = match input.cluster_mode {
        ClusterMode::MultiCluster => EnvironmentType::ALL
            .iter()
            .filter(|env| input.environments.contains(*env))
            .map(|env| environment_plan(input, *env))
            .collect(),
        ClusterMode::SharedCluster => shared_plan(input).into_iter().collect(),
        ClusterMode::PerEnvironment => input
            .effective_environment()
            .map(|env| environment_plan(input, env))
            .into_iter()
            .collect(),
    };

    let environments = plans
        .iter()
        .map(|plan| size_cluster(catalog, input, distribution, plan))
        .collect::<Result<Vec<_>>>()?;

    let grand_total = K8sGrandTotal::from_rows(&environments);

    Ok(K8sSizingResult {
        distribution: input.distribution,
        technology: input.technology,
        cluster_mode: input.cluster_mode,
        environments,
        grand_total,
    })
}

fn environment_plan(input: &K8sSizingInput, environment: EnvironmentType) -> ClusterPlan<'_> {
    let production = environment.is_production();
    ClusterPlan {
        name: environment.name().to_string(),
        environments: vec![environment],
        production,
        workloads: vec![(input.apps_for(environment), input.replicas_for(environment))],
        headroom_percent: input.headroom_for(production),
        overcommit: input.overcommit_for(production),
        hadr: input.hadr_for(production),
    }
}

/// All enabled environments collapse into one cluster sized with prod settings
fn shared_plan(input: &K8sSizingInput) -> Option<ClusterPlan<'_>> {
    let environments: Vec<EnvironmentType> = EnvironmentType::ALL
        .iter()
        .copied()
        .filter(|env| input.environments.contains(env))
        .collect();

    if environments.is_empty() {
        return None;
    }

    let workloads = environments
        .iter()
        .map(|env| (input.apps_for(*env), input.replicas_for(*env)))
        .collect();

    Some(ClusterPlan {
        name: SHARED_CLUSTER_NAME.to_string(),
        environments,
        production: true,
        workloads,
        headroom_percent: input.headroom_for(true),
        overcommit: input.overcommit_for(true),
        hadr: input.hadr_for(true),
    })
}

fn size_cluster(
    catalog: &SizingCatalog,
    input: &K8sSizingInput,
    distribution: &DistributionConfig,
    plan: &ClusterPlan<'_>,
) -> Result<K8sEnvironmentResult> {
    let mut demand = DemandSummary::default();
    let mut apps: u32 = 0;
    let mut pods: u32 = 0;

    for (pool, replicas) in &plan.workloads {
        apps = apps.saturating_add(pool.total());
        pods = pods.saturating_add(pool.total().saturating_mul(*replicas));

        for tier in AppTier::ALL {
            let count = pool.count(tier);
            if count == 0 {
                continue;
            }
            let specs = catalog.tier_specs(input.technology, tier)?;
            let instances = count as f64 * *replicas as f64;
            demand.cpu_cores += instances * specs.cpu_cores;
            demand.ram_gb += instances * specs.ram_gb;
            demand.storage_gb += instances * specs.storage_gb;
        }
    }

    let headroom = 1.0 + plan.headroom_percent / 100.0;
    demand.cpu_cores *= headroom;
    demand.ram_gb *= headroom;
    demand.storage_gb *= headroom;

    let worker_spec = distribution.worker(plan.production);
    let workers = worker_count(&demand, worker_spec, plan.overcommit)?;
    let masters = plan.hadr.master_count(distribution);
    let infra_nodes = infra_node_count(distribution, plan.hadr);
    let total_nodes = masters.saturating_add(infra_nodes).saturating_add(workers);

    let mut base_resources = distribution.master.times(masters)
        + distribution.infra.times(infra_nodes)
        + worker_spec.times(workers);
    base_resources.storage_gb = base_resources
        .storage_gb
        .saturating_add(ceil_whole(demand.storage_gb));

    let multiplier = plan.hadr.cost_multiplier(distribution);
    let resources = base_resources.scaled_ceil(multiplier);

    debug!(
        cluster = %plan.name,
        distribution = %input.distribution,
        apps,
        pods,
        masters,
        infra_nodes,
        workers,
        demand_cpu = demand.cpu_cores,
        demand_ram_gb = demand.ram_gb,
        multiplier,
        "Sized cluster"
    );

    Ok(K8sEnvironmentResult {
        name: plan.name.clone(),
        environments: plan.environments.clone(),
        production: plan.production,
        apps,
        pods,
        masters,
        infra_nodes,
        workers,
        total_nodes,
        demand,
        multiplier,
        base_resources,
        resources,
    })
}

/// Workers needed to host `demand`, bound by the tighter of CPU and memory.
///
/// Overcommit stretches the schedulable capacity of each node; the CPU and
/// memory ratios are applied independently.
pub fn worker_count(
    demand: &DemandSummary,
    worker: NodeSpecs,
    overcommit: OvercommitRatio,
) -> Result<u32> {
    if demand.cpu_cores <= 0.0 && demand.ram_gb <= 0.0 {
        return Ok(0);
    }

    let effective_cpu = worker.cpu_cores as f64 * overcommit.cpu;
    let effective_ram = worker.ram_gb as f64 * overcommit.memory;
    if effective_cpu <= 0.0 || effective_ram <= 0.0 {
        return Err(SizingError::invalid_catalog(
            "distribution",
            "worker capacity must be positive in both CPU and memory",
        ));
    }

    let by_cpu = demand.cpu_cores / effective_cpu;
    let by_ram = demand.ram_gb / effective_ram;
    let nodes = ceil_count(by_cpu.max(by_ram));

    Ok(nodes.max(MIN_WORKERS))
}

fn infra_node_count(distribution: &DistributionConfig, hadr: &K8sHaDrConfig) -> u32 {
    if !distribution.has_infra_nodes {
        return 0;
    }
    match hadr.node_distribution {
        // Second region runs its own router and registry pool
        NodeDistribution::MultiRegion => INFRA_POOL_NODES * 2,
        NodeDistribution::SingleAz | NodeDistribution::DualAz | NodeDistribution::MultiAz => {
            INFRA_POOL_NODES
        }
    }
}
