use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::Error;
use crate::readers::{self, csv::read_delimited};
use crate::registry::{SourceLocation, SourceLocator};
use crate::table::Table;
use crate::types::{Result, DEFAULT_TIMEOUT_SECS};

/// Loads the raw table of one registered source
pub trait SourceFetcher {
    fn fetch(&self, source: &SourceLocator) -> Result<Table>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Fetches Google Sheets through their CSV export and local files through the readers
pub struct SheetFetcher {
    client: Client,
}

impl SheetFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    fn fetch_export(&self, source: &SourceLocator, url: &str) -> Result<Table> {
        debug!(source = %source.key, %url, "downloading csv export");
        let response = self.client.get(url).send()?.error_for_status()?;

        // Private or deleted sheets answer 200 with a sign-in page
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("text/html"))
            .unwrap_or(false);
        if is_html {
            return Err(Error::Fetch {
                source_key: source.key.clone(),
                message: "export returned an HTML page instead of CSV".to_string(),
            });
        }

        let body = response.bytes()?;
        read_delimited(&body[..], b',', source.header_row)
    }
}

impl SourceFetcher for SheetFetcher {
    fn fetch(&self, source: &SourceLocator) -> Result<Table> {
        match &source.location {
            location @ SourceLocation::GoogleSheet { .. } => {
                let url = location.export_url().ok_or_else(|| {
                    Error::InvalidLocator(format!("{} has no export url", source.key))
                })?;
                self.fetch_export(source, &url)
            }
            SourceLocation::File { path } => {
                debug!(source = %source.key, path = %path.display(), "reading local file");
                readers::create_reader(path)?.read_table(source.header_row)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_local_csv_source_uses_header_row() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "banner\nFecha,Region\n01/02/2020,Maule\n").unwrap();

        let source = SourceLocator {
            key: "local".to_string(),
            location: SourceLocation::File {
                path: file.path().to_path_buf(),
            },
            header_row: 1,
        };
        let fetcher = SheetFetcher::new(&FetchConfig::default()).unwrap();
        let table = fetcher.fetch(&source).unwrap();

        assert_eq!(table.columns(), &["Fecha", "Region"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_missing_local_file_is_an_error() {
        let source = SourceLocator {
            key: "gone".to_string(),
            location: SourceLocation::File {
                path: "/nonexistent/2015.csv".into(),
            },
            header_row: 2,
        };
        let fetcher = SheetFetcher::new(&FetchConfig::default()).unwrap();
        assert!(fetcher.fetch(&source).is_err());
    }
}
