//! Rolodex Janitor daemon - evicts expired entries from a registry file

use anyhow::{Context, Result};
use clap::Parser;
use rolodex_janitor::{Janitor, JanitorConfig, JanitorWorker};
use rolodex_store::JsonFileRegistry;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Retention janitor for a Rolodex registry file
#[derive(Parser, Debug)]
#[command(name = "rolodex-janitor", version, about)]
struct Cli {
    /// Registry JSON file to sweep
    #[arg(long, env = "ROLODEX_REGISTRY")]
    registry: PathBuf,

    /// Janitor configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single sweep and exit
    #[arg(long)]
    once: bool,

    /// Log expired entries without evicting them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    // Log to stderr, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => JanitorConfig::from_file(path)?,
        None => JanitorConfig::default(),
    };
    config.dry_run |= cli.dry_run;

    let mut registry = JsonFileRegistry::open(&cli.registry)
        .with_context(|| format!("Failed to open registry {}", cli.registry.display()))?;

    if cli.once {
        let mut janitor = Janitor::new(config);
        let metrics = janitor.sweep(&mut registry)?;
        println!("{}", metrics.summary());
        return Ok(());
    }

    let mut worker = JanitorWorker::new(config);
    worker.run(Arc::new(Mutex::new(registry))).await?;
    Ok(())
}
