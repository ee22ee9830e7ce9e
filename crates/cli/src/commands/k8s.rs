//! Kubernetes sizing command

use anyhow::Result;
use colored::Colorize;
use sizing_lib::{K8sSizingInput, K8sSizingResult};
use std::path::Path;
use tabled::Tabled;

use super::{wire_name, Backend};
use crate::config::read_input;
use crate::output::{format_multiplier, print_heading, print_json, print_table, OutputFormat};

/// Row for the per-cluster table
#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Cluster")]
    name: String,
    #[tabled(rename = "Apps")]
    apps: u32,
    #[tabled(rename = "Pods")]
    pods: u32,
    #[tabled(rename = "Masters")]
    masters: u32,
    #[tabled(rename = "Infra")]
    infra: u32,
    #[tabled(rename = "Workers")]
    workers: u32,
    #[tabled(rename = "Nodes")]
    nodes: u32,
    #[tabled(rename = "vCPU")]
    cpu: u64,
    #[tabled(rename = "RAM (GB)")]
    ram: u64,
    #[tabled(rename = "Storage (GB)")]
    storage: u64,
    #[tabled(rename = "HA/DR")]
    multiplier: String,
}

/// Size Kubernetes clusters from a JSON input file
pub async fn run(backend: &Backend, input: &Path, format: OutputFormat) -> Result<()> {
    let input: K8sSizingInput = read_input(input)?;
    let result = backend.k8s(&input).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => render(&result),
    }
}

fn render(result: &K8sSizingResult) -> Result<()> {
    print_heading("Kubernetes Sizing");
    println!("Distribution:           {}", result.distribution.to_string().cyan());
    println!("Technology:             {}", result.technology);
    println!("Cluster mode:           {}", wire_name(&result.cluster_mode)?);
    println!();

    let mut rows: Vec<ClusterRow> = result
        .environments
        .iter()
        .map(|env| ClusterRow {
            name: env.name.clone(),
            apps: env.apps,
            pods: env.pods,
            masters: env.masters,
            infra: env.infra_nodes,
            workers: env.workers,
            nodes: env.total_nodes,
            cpu: env.resources.cpu_cores,
            ram: env.resources.ram_gb,
            storage: env.resources.storage_gb,
            multiplier: format_multiplier(env.multiplier),
        })
        .collect();

    let total = &result.grand_total;
    rows.push(ClusterRow {
        name: "Total".to_string(),
        apps: total.apps,
        pods: total.pods,
        masters: total.masters,
        infra: total.infra_nodes,
        workers: total.workers,
        nodes: total.total_nodes,
        cpu: total.resources.cpu_cores,
        ram: total.resources.ram_gb,
        storage: total.resources.storage_gb,
        multiplier: String::new(),
    });
    print_table(rows);

    println!(
        "{} {} nodes across {} cluster(s)",
        "Grand total:".bold(),
        total.total_nodes.to_string().green().bold(),
        total.clusters
    );

    Ok(())
}
