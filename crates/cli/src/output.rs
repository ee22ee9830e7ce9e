//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use sizing_lib::growth::{Priority, Severity};
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Parse the `default_format` value of the config file
    pub fn from_config(value: &str) -> Option<Self> {
        OutputFormat::from_str(value, true).ok()
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(60));
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format currency
pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Format a multiplier such as 1.8 as `1.80x`
pub fn format_multiplier(value: f64) -> String {
    format!("{:.2}x", value)
}

pub fn color_severity(severity: Severity) -> String {
    match severity {
        Severity::Info => "info".blue().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
        Severity::Critical => "critical".red().bold().to_string(),
    }
}

pub fn color_priority(priority: Priority) -> String {
    match priority {
        Priority::Low => "low".normal().to_string(),
        Priority::Medium => "medium".yellow().to_string(),
        Priority::High => "high".red().to_string(),
    }
}
