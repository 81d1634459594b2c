use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Header row used by every source without an override (two banner rows above it)
pub const DEFAULT_HEADER_ROW: usize = 2;

/// Default HTTP timeout for a single source fetch, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default snapshot file written by `consolidate`
pub const DEFAULT_SNAPSHOT_PATH: &str = "consolidated_data.parquet";

/// Columns the dashboard reads for filters and charts
pub const DASHBOARD_COLUMNS: &[&str] = &[
    "fecha",
    "region",
    "nombre_victima",
    "edad_victima",
    "edad_femicida",
    "nacionalidad_victima",
    "nacionalidad_femicida",
    "ocupacion_victima",
    "ocupacion_femicida",
    "forma_agresion",
    "violencia_sexual",
    "relacion_victimafemicida",
    "informacion_sobre_hecho",
    "categoria_red_chilena",
    "tipificacion_penal",
    "registro_sernameg",
    "sentencia",
];

/// A present cell value. Missing cells are `None` at the table level.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn text(s: &str) -> Self {
        Value::Text(s.to_string())
    }

    #[cfg(test)]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value the way it is written to text columns of the snapshot
    pub fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Supported local file formats for sources and readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Tsv,
    Excel,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "tsv" | "tab" => Some(FileFormat::Tsv),
            "xlsx" | "xls" | "xlsm" | "xlsb" => Some(FileFormat::Excel),
            _ => None,
        }
    }
}

/// How the classification merge behaves when one of its two columns is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Both columns must exist; otherwise the source fails with a schema error
    #[default]
    Strict,
    /// Missing legacy column is a no-op; a lone legacy column takes the canonical name
    Lenient,
}

/// Result of reconciling one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Loaded { rows: usize },
    Failed { reason: String },
}

/// Per-source entry of a consolidation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub key: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

impl SourceOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, SourceStatus::Loaded { .. })
    }
}

/// Result type for the application
pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_whole_number_without_fraction() {
        assert_eq!(Value::Number(32.0).render(), "32");
        assert_eq!(Value::Number(32.5).render(), "32.5");
    }

    #[test]
    fn test_render_date_iso() {
        let d = NaiveDate::from_ymd_opt(2019, 3, 8).unwrap();
        assert_eq!(Value::Date(d).render(), "2019-03-08");
    }

    #[test]
    fn test_file_format_from_extension() {
        assert_eq!(FileFormat::from_extension("CSV"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_extension("xlsx"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::from_extension("pkl"), None);
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let outcome = SourceOutcome {
            key: "gsheet_2015".to_string(),
            status: SourceStatus::Failed {
                reason: "boom".to_string(),
            },
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("\"reason\":\"boom\""));
        assert!(!outcome.is_loaded());
    }
}
