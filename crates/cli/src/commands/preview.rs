//! Catalog lookups shown before running a full calculation

use anyhow::Result;
use colored::Colorize;
use sizing_lib::{
    vm::{ha_multiplier, HaPattern},
    AppTier, LoadBalancerOption, ServerRole, Technology,
};

use super::{wire_name, Backend};
use crate::client::{HaPreview, LoadBalancerPreview, RolePreview};
use crate::output::{format_multiplier, print_json, OutputFormat};

pub async fn role(
    backend: &Backend,
    role: ServerRole,
    tier: AppTier,
    technology: Technology,
    format: OutputFormat,
) -> Result<()> {
    let preview: RolePreview = match backend {
        Backend::Local { catalog } => RolePreview {
            role,
            tier,
            technology,
            specs: catalog.role_specs(role, tier, technology)?,
        },
        Backend::Remote(client) => {
            let query = [
                ("role", wire_name(&role)?),
                ("tier", wire_name(&tier)?),
                ("technology", wire_name(&technology)?),
            ];
            client.get("api/v1/preview/role", &query).await?
        }
    };

    match format {
        OutputFormat::Json => print_json(&preview)?,
        OutputFormat::Table => {
            println!(
                "{} {} ({}, {})",
                "Role:".bold(),
                preview.role.to_string().cyan(),
                preview.tier,
                preview.technology
            );
            println!("vCPU per VM:            {}", preview.specs.cpu_cores);
            println!("RAM per VM (GB):        {}", preview.specs.ram_gb);
        }
    }

    Ok(())
}

pub async fn ha(backend: &Backend, pattern: HaPattern, format: OutputFormat) -> Result<()> {
    let preview: HaPreview = match backend {
        Backend::Local { .. } => HaPreview {
            pattern,
            multiplier: ha_multiplier(pattern),
        },
        Backend::Remote(client) => {
            let query = [("pattern", wire_name(&pattern)?)];
            client.get("api/v1/preview/ha-multiplier", &query).await?
        }
    };

    match format {
        OutputFormat::Json => print_json(&preview)?,
        OutputFormat::Table => println!(
            "{} {} per configured instance",
            wire_name(&preview.pattern)?.cyan(),
            format_multiplier(preview.multiplier).bold()
        ),
    }

    Ok(())
}

pub async fn load_balancer(
    backend: &Backend,
    option: LoadBalancerOption,
    format: OutputFormat,
) -> Result<()> {
    let preview: LoadBalancerPreview = match backend {
        Backend::Local { catalog } => LoadBalancerPreview {
            option,
            specs: catalog.load_balancer_specs(option)?,
        },
        Backend::Remote(client) => {
            let query = [("option", wire_name(&option)?)];
            client.get("api/v1/preview/load-balancer", &query).await?
        }
    };

    match format {
        OutputFormat::Json => print_json(&preview)?,
        OutputFormat::Table => {
            println!("{} {}", "Load balancer:".bold(), preview.option.to_string().cyan());
            println!("VMs:                    {}", preview.specs.vm_count);
            println!("vCPU per VM:            {}", preview.specs.cpu_per_vm);
            println!("RAM per VM (GB):        {}", preview.specs.ram_per_vm);
        }
    }

    Ok(())
}
