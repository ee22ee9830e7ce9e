//! Growth projection command

use anyhow::Result;
use colored::Colorize;
use sizing_lib::{CostModelKind, GrowthProjection, GrowthRequest};
use std::path::Path;
use tabled::Tabled;

use super::{wire_name, Backend};
use crate::config::read_input;
use crate::output::{
    color_priority, color_severity, format_currency, print_heading, print_info, print_json,
    print_table, print_warning, OutputFormat,
};

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Factor")]
    factor: String,
    #[tabled(rename = "Apps")]
    apps: u32,
    #[tabled(rename = "Pods")]
    pods: u32,
    #[tabled(rename = "Nodes")]
    nodes: u32,
    #[tabled(rename = "vCPU")]
    cpu: u64,
    #[tabled(rename = "RAM (GB)")]
    ram: u64,
    #[tabled(rename = "Monthly Cost")]
    monthly_cost: String,
}

#[derive(Tabled)]
struct WarningRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Limit")]
    limit: String,
    #[tabled(rename = "Utilization")]
    utilization: String,
    #[tabled(rename = "Severity")]
    severity: String,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Action")]
    kind: String,
    #[tabled(rename = "Details")]
    message: String,
}

/// Project growth from a JSON request file
pub async fn run(
    backend: &Backend,
    input: &Path,
    cost_model: Option<CostModelKind>,
    format: OutputFormat,
) -> Result<()> {
    let mut request: GrowthRequest = read_input(input)?;
    if cost_model.is_some() {
        request.cost_model = cost_model;
    }
    let projection = backend.growth(&request).await?;

    match format {
        OutputFormat::Json => print_json(&projection),
        OutputFormat::Table => render(&projection),
    }
}

fn render(projection: &GrowthProjection) -> Result<()> {
    let settings = &projection.settings;
    print_heading("Growth Projection");
    println!("Baseline:               {}", projection.baseline_kind.cyan());
    println!(
        "Pattern:                {} at {}% per year",
        wire_name(&settings.pattern)?,
        settings.annual_growth_rate
    );
    println!("Cost model:             {}", projection.cost_model);
    println!();

    let rows: Vec<PointRow> = projection
        .points
        .iter()
        .map(|point| PointRow {
            year: point.calendar_year,
            factor: format!("{:.3}", point.growth_factor),
            apps: point.projected_apps,
            pods: point.pods,
            nodes: point.nodes,
            cpu: point.resources.cpu_cores,
            ram: point.resources.ram_gb,
            monthly_cost: format_currency(point.monthly_cost),
        })
        .collect();
    print_table(rows);

    if !projection.warnings.is_empty() {
        println!();
        println!("{}", "Cluster Limit Warnings".bold());
        let rows: Vec<WarningRow> = projection
            .warnings
            .iter()
            .map(|w| WarningRow {
                year: w.calendar_year,
                cluster: w.cluster.clone(),
                limit: w.limit.to_string(),
                utilization: format!("{:.1}%", w.utilization_percent),
                severity: color_severity(w.severity),
            })
            .collect();
        print_table(rows);
    }

    if !projection.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations".bold());
        let mut rows = Vec::with_capacity(projection.recommendations.len());
        for rec in &projection.recommendations {
            rows.push(RecommendationRow {
                year: rec.calendar_year,
                priority: color_priority(rec.priority),
                kind: wire_name(&rec.kind)?,
                message: rec.message.clone(),
            });
        }
        print_table(rows);
    }

    let summary = &projection.summary;
    println!();
    println!("{}", "Summary".bold());
    println!("{}", "-".repeat(60));
    println!(
        "Apps:                   {} -> {} ({:+.1}%)",
        summary.baseline_apps, summary.final_apps, summary.total_growth_percent
    );
    println!(
        "Nodes:                  {} -> {} (peak {}, CAGR {:.1}%)",
        summary.baseline_nodes, summary.final_nodes, summary.peak_nodes, summary.node_cagr_percent
    );
    println!(
        "Projected cost:         {} ({} per year on average)",
        format_currency(summary.total_cost).green(),
        format_currency(summary.average_annual_cost)
    );

    match summary.first_critical_year {
        Some(year) => print_warning(&format!(
            "{} critical limit breach(es), first in {}",
            summary.critical_count, year
        )),
        None if summary.warning_count > 0 => {
            print_info(&format!("{} cluster limit warning(s)", summary.warning_count))
        }
        None => print_info("All clusters stay within their limits"),
    }

    Ok(())
}
