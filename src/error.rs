use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("Fetch failed for {source_key}: {message}")]
    Fetch { source_key: String, message: String },

    #[error("Expected column '{column}' is absent")]
    MissingColumn { column: String },

    #[error("Column '{column}' appears more than once after cleanup")]
    DuplicateColumn { column: String },

    #[error("Invalid source locator: {0}")]
    InvalidLocator(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn missing_column(column: &str) -> Self {
        Error::MissingColumn {
            column: column.to_string(),
        }
    }
}
