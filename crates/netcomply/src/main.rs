//! netcomply
//!
//! Checks a fleet of network devices against the inventory: every device's
//! serial number, hostname, hardware model, software version and uptime are
//! read live over SNMP and compared with its inventory record.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use eyre::{WrapErr, eyre};
use netcomply_core::FleetOrchestrator;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod factory;

use config::Config;

/// Network device compliance checks
#[derive(Parser, Debug)]
#[command(name = "netcomply", version, about, long_about = None)]
struct Cli {
    /// Inventory environment to check (e.g. prod, dev)
    #[arg(short, long, required_unless_present = "print_default_config")]
    env: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only check this device (repeatable)
    #[arg(short, long = "device", value_name = "NAME")]
    devices: Vec<String>,

    /// Devices checked in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    summary_json: bool,

    /// Print an example config file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    // RUST_LOG wins over the configured level
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", config::example_toml());
        return Ok(());
    }

    let (mut config, source) = Config::load_default(cli.config.as_deref())?;
    if let Some(concurrency) = cli.concurrency {
        config.run.concurrency = concurrency;
        config.validate()?;
    }

    init_tracing(&config.run.log_level, cli.log_json)?;

    match &source {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => warn!("no config file found, using defaults"),
    }

    let env_name = cli.env.ok_or_else(|| eyre!("--env is required"))?;
    let environment = config.environment(&env_name)?;

    let token = factory::read_secret(&environment.token_env)
        .wrap_err_with(|| format!("API token for the {env_name} environment not found"))?;

    let inventory = factory::inventory_client(&config, environment, token)?;
    let transport = factory::snmp_transport(&config.snmp)?;
    let registry = factory::build_registry(&config).await?;

    let unrouted = registry.unregistered_kinds();
    if !unrouted.is_empty() {
        warn!(kinds = ?unrouted, "error kinds without a reporter abort the run when raised");
    }

    let orchestrator =
        FleetOrchestrator::new(inventory, transport, Arc::new(registry), &config.fleet());
    let filter = config.device_filter(&cli.devices);

    info!(
        environment = %env_name,
        url = %environment.url,
        concurrency = config.run.concurrency,
        "starting compliance run"
    );

    let report = orchestrator.run(&filter).await?;

    for (kind, devices) in report.failures_by_kind() {
        info!(%kind, devices, "failures");
    }
    if report.undelivered_reports > 0 {
        warn!(
            undelivered = report.undelivered_reports,
            "some reports could not be delivered"
        );
    }

    if cli.summary_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
