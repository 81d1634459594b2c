use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{DEFAULT_SNAPSHOT_PATH, DEFAULT_TIMEOUT_SECS};

/// Consolidate the yearly femicide case spreadsheets into one canonical table
#[derive(Parser, Debug)]
#[command(name = "femicidios-consolidator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every registered source, reconcile it and write the snapshot
    Consolidate {
        /// Registry JSON file (built-in sheet list if not specified)
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Reconciliation config JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Snapshot output path
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_PATH)]
        out: PathBuf,

        /// Run report JSON path (stdout if not specified)
        #[arg(long)]
        report: Option<PathBuf>,

        /// HTTP timeout per source, in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,

        /// Treat a missing legacy classification column as a no-op
        #[arg(long, default_value_t = false)]
        lenient_merge: bool,
    },

    /// List registered sources and where they are fetched from
    Sources {
        /// Registry JSON file (built-in sheet list if not specified)
        #[arg(long)]
        registry: Option<PathBuf>,
    },

    /// Summarize the columns of a snapshot
    Inspect {
        /// Snapshot file to read
        #[arg(short, long, default_value = DEFAULT_SNAPSHOT_PATH)]
        snapshot: PathBuf,
    },
}
