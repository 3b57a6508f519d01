//! bdsyncd - Bridge Domain Sync Provider
//!
//! Runs one synchronization pass over the configured groups against an
//! inventory snapshot and prints the result log.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use kuwaiba_bdsyncd::{BridgeDomainSyncProvider, SyncConfig, DEFAULT_CONFIG_PATH};
use kuwaiba_inventory::InMemoryInventory;
use kuwaiba_sync_common::{SshCommandRunner, SyncProvider, SyncResult, SyncResultType};

/// Kuwaiba bridge domain synchronization
#[derive(Parser, Debug)]
#[command(name = "bdsyncd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Inventory snapshot (JSON)
    #[arg(short = 'i', long)]
    inventory: PathBuf,

    /// Only synchronize these groups (by id)
    #[arg(short = 'g', long = "group")]
    groups: Vec<String>,

    /// Write the updated inventory back to the snapshot
    #[arg(long)]
    save: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_logging(log_level: &str, json: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

async fn run(args: Args) -> anyhow::Result<Vec<SyncResult>> {
    let config = SyncConfig::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    config.validate().context("invalid configuration")?;

    let inventory = Arc::new(
        InMemoryInventory::load(&args.inventory)
            .await
            .with_context(|| format!("loading inventory {}", args.inventory.display()))?,
    );
    let runner = Arc::new(SshCommandRunner::new(config.ssh_options()));
    let provider = BridgeDomainSyncProvider::new(inventory.clone(), inventory.clone(), runner)
        .with_user(&config.user);

    let groups: Vec<_> = config
        .synchronization_groups()
        .into_iter()
        .filter(|g| args.groups.is_empty() || args.groups.contains(&g.id))
        .collect();
    if groups.is_empty() {
        bail!("no synchronization group selected");
    }

    let mut results = Vec::new();
    for group in &groups {
        info!(group = %group.name, devices = group.configurations.len(), "Synchronizing group");
        results.extend(provider.automated_sync(group).await);
    }

    if args.save {
        inventory
            .save(&args.inventory)
            .await
            .with_context(|| format!("saving inventory {}", args.inventory.display()))?;
        info!(path = %args.inventory.display(), "Inventory saved");
    }

    Ok(results)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_json);

    info!("Starting bdsyncd");
    let json = args.json;

    let results = match run(args).await {
        Ok(results) => results,
        Err(e) => {
            error!("bdsyncd failed: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                error!("Failed to serialize results: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for result in &results {
            println!("{} {}", result.data_source_id(), result);
        }
    }

    let errors = results
        .iter()
        .filter(|r| r.result_type() == SyncResultType::Error)
        .count();
    info!(results = results.len(), errors, "Synchronization finished");

    if errors > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
