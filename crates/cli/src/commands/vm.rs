//! VM fleet sizing command

use anyhow::Result;
use colored::Colorize;
use sizing_lib::{vm::VmDrPattern, VmSizingInput, VmSizingResult};
use std::path::Path;
use tabled::Tabled;

use super::{wire_name, Backend};
use crate::config::read_input;
use crate::output::{print_heading, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct EnvironmentRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "HA")]
    ha: String,
    #[tabled(rename = "DR")]
    dr: String,
    #[tabled(rename = "Primary VMs")]
    primary_vms: u32,
    #[tabled(rename = "LB VMs")]
    lb_vms: u32,
    #[tabled(rename = "DR VMs")]
    dr_vms: u32,
    #[tabled(rename = "Total VMs")]
    total_vms: u32,
    #[tabled(rename = "vCPU")]
    cpu: u64,
    #[tabled(rename = "RAM (GB)")]
    ram: u64,
    #[tabled(rename = "Storage (GB)")]
    storage: u64,
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "Environment")]
    environment: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Instances")]
    instances: String,
    #[tabled(rename = "vCPU/VM")]
    cpu_per_vm: u32,
    #[tabled(rename = "RAM/VM (GB)")]
    ram_per_vm: u32,
}

/// Size VM environments from a JSON input file
pub async fn run(backend: &Backend, input: &Path, format: OutputFormat) -> Result<()> {
    let input: VmSizingInput = read_input(input)?;
    let result = backend.vm(&input).await?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Table => render(&result),
    }
}

fn describe_dr(pattern: VmDrPattern) -> String {
    match pattern {
        VmDrPattern::None => "none".to_string(),
        VmDrPattern::WarmStandby => "warm_standby".to_string(),
        VmDrPattern::HotStandby => "hot_standby".to_string(),
        VmDrPattern::MultiRegion { extra_regions } => format!("multi_region (+{})", extra_regions),
    }
}

fn render(result: &VmSizingResult) -> Result<()> {
    print_heading("VM Sizing");
    println!("Technology:             {}", result.technology);
    println!();

    let mut roles = Vec::new();
    let mut rows = Vec::with_capacity(result.environments.len());
    for env in &result.environments {
        rows.push(EnvironmentRow {
            environment: env.environment.to_string(),
            ha: wire_name(&env.ha_pattern)?,
            dr: describe_dr(env.dr_pattern),
            primary_vms: env.primary_vms,
            lb_vms: env.load_balancer_vms,
            dr_vms: env.dr_site.as_ref().map_or(0, |site| site.vm_count),
            total_vms: env.total_vms,
            cpu: env.resources.cpu_cores,
            ram: env.resources.ram_gb,
            storage: env.resources.storage_gb,
        });

        roles.extend(env.roles.iter().map(|role| RoleRow {
            environment: env.environment.to_string(),
            role: role.role.to_string(),
            tier: role.tier.to_string(),
            instances: if role.effective_instances == role.configured_instances {
                role.effective_instances.to_string()
            } else {
                format!(
                    "{} (+{})",
                    role.configured_instances,
                    role.effective_instances - role.configured_instances
                )
            },
            cpu_per_vm: role.cpu_per_vm,
            ram_per_vm: role.ram_per_vm,
        }));
    }

    print_table(rows);
    println!();
    println!("{}", "Roles".bold());
    print_table(roles);

    let total = &result.grand_total;
    println!(
        "{} {} VMs ({} primary, {} DR), {} vCPU, {} GB RAM, {} GB storage",
        "Grand total:".bold(),
        total.total_vms.to_string().green().bold(),
        total.primary_vms,
        total.dr_vms,
        total.resources.cpu_cores,
        total.resources.ram_gb,
        total.resources.storage_gb
    );

    Ok(())
}
