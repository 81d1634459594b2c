use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::reconcile::Consolidation;
use crate::types::{Result, SourceOutcome};

/// Summary of one consolidation run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub sources_total: usize,
    pub sources_loaded: usize,
    pub sources_failed: usize,
    pub rows: usize,
    pub columns: Vec<String>,
    pub snapshot_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_sha256: Option<String>,
    pub sources: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn new(consolidation: &Consolidation, snapshot_path: &Path) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            sources_total: consolidation.outcomes.len(),
            sources_loaded: consolidation.loaded_count(),
            sources_failed: consolidation.failed_count(),
            rows: consolidation.table.row_count(),
            columns: consolidation.table.columns().to_vec(),
            snapshot_path: snapshot_path.display().to_string(),
            snapshot_sha256: None,
            sources: consolidation.outcomes.clone(),
        }
    }

    pub fn with_digest(mut self, sha256: String) -> Self {
        self.snapshot_sha256 = Some(sha256);
        self
    }
}

/// Write a serializable value to a pretty JSON file
pub fn write_json_file<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write a serializable value to stdout
pub fn write_json_stdout<T: Serialize>(value: &T) -> Result<()> {
    let json = to_json_string(value)?;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", json)?;
    Ok(())
}
