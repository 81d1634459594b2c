mod cli;
mod config;
mod error;
mod fetch;
mod inference;
mod normalize;
mod output;
mod readers;
mod reconcile;
mod registry;
mod snapshot;
mod stats;
mod table;
mod types;

use std::path::{Path, PathBuf};

use clap::Parser;
use cli::{Cli, Commands};
use config::ReconcileConfig;
use fetch::{FetchConfig, SheetFetcher};
use registry::Registry;
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::{MergePolicy, Result};

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Consolidate {
            registry,
            config,
            out,
            report,
            timeout_secs,
            lenient_merge,
        } => {
            let registry = load_registry(registry.as_deref())?;
            let mut config = match config {
                Some(path) => ReconcileConfig::from_json_file(&path)?,
                None => ReconcileConfig::default(),
            };
            if lenient_merge {
                config.merge_policy = MergePolicy::Lenient;
            }
            run_consolidate(&registry, &config, timeout_secs, &out, report)?;
        }
        Commands::Sources { registry } => {
            let registry = load_registry(registry.as_deref())?;
            output::write_json_stdout(&registry.listing())?;
        }
        Commands::Inspect { snapshot } => {
            let table = snapshot::read_snapshot(&snapshot)?;
            info!(path = %snapshot.display(), rows = table.row_count(), "snapshot loaded");
            output::write_json_stdout(&stats::summarize(&table))?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(path: Option<&Path>) -> Result<Registry> {
    let registry = match path {
        Some(path) => Registry::from_json_file(path)?,
        None => Registry::builtin()?,
    };
    info!(sources = registry.len(), "registry loaded");
    Ok(registry)
}

fn run_consolidate(
    registry: &Registry,
    config: &ReconcileConfig,
    timeout_secs: u64,
    out: &Path,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let fetcher = SheetFetcher::new(&FetchConfig {
        timeout_secs,
        ..FetchConfig::default()
    })?;

    let consolidation = reconcile::consolidate(registry, &fetcher, config);

    snapshot::write_snapshot(&consolidation.table, out)?;
    let digest = snapshot::compute_file_hash(out)?;
    info!(path = %out.display(), sha256 = %digest, "snapshot written");

    let report = output::RunReport::new(&consolidation, out).with_digest(digest);
    match report_path {
        Some(path) => {
            output::write_json_file(&report, &path)?;
            info!(path = %path.display(), "run report written");
        }
        None => output::write_json_stdout(&report)?,
    }

    Ok(())
}
