//! Infrastructure sizing CLI
//!
//! Sizes Kubernetes clusters and VM fleets from JSON input files, projects
//! their growth, and previews catalog entries. Calculations run in-process
//! unless `--remote` sends them to a sizing service.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{growth, k8s, parse_enum, preview, vm, Backend};
use sizing_lib::{
    vm::HaPattern, AppTier, CostModelKind, LoadBalancerOption, ServerRole, Technology,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Infrastructure sizing CLI
#[derive(Parser)]
#[command(name = "sizer")]
#[command(author, version, about = "Kubernetes and VM infrastructure sizing", long_about = None)]
pub struct Cli {
    /// Sizing service URL used with --remote (can also be set via SIZER_API_URL env var)
    #[arg(long, env = "SIZER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Send calculations to the sizing service instead of computing locally
    #[arg(long, global = true)]
    pub remote: bool,

    /// Catalog overrides file for local calculations
    #[arg(long, env = "SIZER_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Output format [default: table]
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Size Kubernetes clusters
    K8s {
        /// JSON sizing input
        input: PathBuf,
    },

    /// Size VM environments
    Vm {
        /// JSON sizing input
        input: PathBuf,
    },

    /// Project a baseline over several years
    Growth {
        /// JSON request with `baseline`, `settings` and optional `cost_model`
        input: PathBuf,

        /// Cost model (on_prem, aws, azure, gcp); overrides the request file
        #[arg(long, value_parser = parse_cost_model)]
        cost_model: Option<CostModelKind>,
    },

    /// Preview catalog entries
    #[command(subcommand)]
    Preview(PreviewCommands),
}

#[derive(Subcommand)]
pub enum PreviewCommands {
    /// Specs of one VM role
    Role {
        /// Server role (web, app, database, cache, message_queue, ...)
        #[arg(long, value_parser = parse_enum::<ServerRole>)]
        role: ServerRole,

        /// Application tier (small, medium, large, xlarge)
        #[arg(long, value_parser = parse_enum::<AppTier>)]
        tier: AppTier,

        /// Technology stack (dotnet, java, nodejs, python, go, mendix, outsystems)
        #[arg(long, value_parser = parse_enum::<Technology>)]
        technology: Technology,
    },

    /// Instance multiplier of an HA pattern
    Ha {
        /// HA pattern (none, active_active, active_passive, n_plus_1, n_plus_2)
        #[arg(value_parser = parse_enum::<HaPattern>)]
        pattern: HaPattern,
    },

    /// VMs charged for a load balancer option
    Lb {
        /// Load balancer option (none, single, ha_pair, cloud_managed)
        #[arg(value_parser = parse_enum::<LoadBalancerOption>)]
        option: LoadBalancerOption,
    },
}

fn parse_cost_model(value: &str) -> Result<CostModelKind, String> {
    value.parse()
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("sizing_lib=debug,sizer=debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli).await {
        output::print_error(&format!("{:#}", e));
        if let Some(client::ClientError::Api {
            field: Some(field), ..
        }) = e.downcast_ref::<client::ClientError>()
        {
            eprintln!("  field: {}", field);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;

    let format = cli
        .format
        .or_else(|| {
            config
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_config)
        })
        .unwrap_or_default();

    // Initialize backend
    let backend = if cli.remote {
        let api_url = cli
            .api_url
            .or(config.api_url)
            .unwrap_or_else(|| config::DEFAULT_API_URL.to_string());
        Backend::Remote(client::ApiClient::new(&api_url)?)
    } else {
        let catalog_path = cli.catalog.or(config.catalog_path.map(PathBuf::from));
        Backend::Local {
            catalog: config::load_catalog(catalog_path.as_deref())?,
        }
    };

    // Execute command
    match cli.command {
        Commands::K8s { input } => k8s::run(&backend, &input, format).await?,
        Commands::Vm { input } => vm::run(&backend, &input, format).await?,
        Commands::Growth { input, cost_model } => {
            growth::run(&backend, &input, cost_model, format).await?
        }
        Commands::Preview(preview_cmd) => match preview_cmd {
            PreviewCommands::Role {
                role,
                tier,
                technology,
            } => preview::role(&backend, role, tier, technology, format).await?,
            PreviewCommands::Ha { pattern } => preview::ha(&backend, pattern, format).await?,
            PreviewCommands::Lb { option } => {
                preview::load_balancer(&backend, option, format).await?
            }
        },
    }

    Ok(())
}
