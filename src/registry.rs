use std::collections::HashSet;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Result, DEFAULT_HEADER_ROW};

const EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d";

/// Yearly case sheets, in processing order
const GOOGLE_SHEETS: &[(&str, &str)] = &[
    ("gsheet_2010", "https://docs.google.com/spreadsheets/d/1NZbfUM_kr3wkNpSdBUYPspYsPoZCmBKGwz7u7gTtZxE/edit?gid=1386807876#gid=1386807876"),
    ("gsheet_2011", "https://docs.google.com/spreadsheets/d/1oxRoLXqxxiYEl259j_gmjqO46TX8W6jI6p4tNcnqMIM/edit?gid=1641093590#gid=1641093590"),
    ("gsheet_2012", "https://docs.google.com/spreadsheets/d/1XPuP0fa1RAoPkH_hx3kP_T2SqeKb-TQLhg8VhuRgz5s/edit?gid=1616045159#gid=1616045159"),
    ("gsheet_2013", "https://docs.google.com/spreadsheets/d/1sGVgb9WUs_oR54GPHLl1gaMap22u81OdvHFCbo25reg/edit?gid=540656633#gid=540656633"),
    ("gsheet_2014", "https://docs.google.com/spreadsheets/d/11oOHfiXHvvA_XlO5iMojbnBviAwk6_Xw9uw9XVo4Fjc/edit?gid=1952631340#gid=1952631340"),
    ("gsheet_2015", "https://docs.google.com/spreadsheets/d/1jr0JQ1SbsgKBj6BBR5eyh7bVh6HVHO737JB3FyPP-FE/edit?gid=1952631340#gid=1952631340"),
    ("gsheet_2016", "https://docs.google.com/spreadsheets/d/1zdc1SdIoc74iJJ7Uk1hQ8ezTXdc0VHYUlWq1eKakSkI/edit?gid=1952631340#gid=1952631340"),
    ("gsheet_2017", "https://docs.google.com/spreadsheets/d/1OY8YymIGJzEYTBVKwpkGE-vDsYz3rKSjNe1TUj3qt40/edit#gid=0"),
    ("gsheet_2018", "https://docs.google.com/spreadsheets/d/1G4AHA5gTppfX7FCljkTNq3klBn20gA0ci0PReeNKcn4/edit?gid=0#gid=0"),
    ("gsheet_2019", "https://docs.google.com/spreadsheets/d/1gECmI2yOJYcA9UDmfHTPZXv5v5kTcA-k37A5c8vBq7g/edit?gid=1952631340#gid=1952631340"),
    ("gsheet_2020", "https://docs.google.com/spreadsheets/d/1s_g16Ttsm0S1_9oMH2xilgDMRNaJTALjjV-wAdR5xVc/edit#gid=1952631340"),
    ("gsheet_2021", "https://docs.google.com/spreadsheets/d/1ul4zEar8EoiTggJevwpi5sfdaez1gsV3xWTy6u4VrO4/edit#gid=1952631340"),
    ("gsheet_2022", "https://docs.google.com/spreadsheets/d/1LRLaBLwbV3up9N5e3-HlLKTlFAFy7-sj5pxbt5ml4hc/edit?gid=1952631340#gid=1952631340"),
    ("gsheet_2023", "https://docs.google.com/spreadsheets/d/1W3ISt-tJlgZ7W_BJ5j22Ln5PBNKDOr7qa8X8Ipt7KMA/edit#gid=1952631340"),
    ("gsheet_2024", "https://docs.google.com/spreadsheets/d/19sq-trJ3L809F_EChMvGwHYZEiC4B8aC/edit?gid=392110818#gid=392110818"),
    ("gsheet_2025", "https://docs.google.com/spreadsheets/d/1w9zRApJRSq0o_YZxpCe3BcQzl5ocjMzM/edit?gid=392110818#gid=392110818"),
    ("gsheet_2026", "https://docs.google.com/spreadsheets/d/1U_0siHk90P0989Q0OPhXFaJBVbztW_xN/edit?gid=392110818#gid=392110818"),
];

/// The 2021 sheet has a single banner row above its header
const HEADER_ROW_OVERRIDES: &[(&str, usize)] = &[("gsheet_2021", 1)];

static SPREADSHEET_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/d/([a-zA-Z0-9_-]+)/").unwrap());
static SHEET_GID: Lazy<Regex> = Lazy::new(|| Regex::new(r"#gid=(\d+)").unwrap());

/// Where a source's rows come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceLocation {
    GoogleSheet { spreadsheet_id: String, gid: String },
    File { path: PathBuf },
}

impl SourceLocation {
    /// Parse a Google Sheets URL into its document and sheet identifiers.
    /// A URL without a sheet anchor points at the first sheet (gid 0).
    pub fn from_sheet_url(url: &str) -> Result<Self> {
        let spreadsheet_id = SPREADSHEET_ID
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| Error::InvalidLocator(format!("no spreadsheet id in {url}")))?;
        let gid = SHEET_GID
            .captures(url)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "0".to_string());
        Ok(SourceLocation::GoogleSheet {
            spreadsheet_id,
            gid,
        })
    }

    /// CSV export URL for sheet sources
    pub fn export_url(&self) -> Option<String> {
        match self {
            SourceLocation::GoogleSheet {
                spreadsheet_id,
                gid,
            } => Some(format!(
                "{EXPORT_BASE}/{spreadsheet_id}/export?format=csv&gid={gid}"
            )),
            SourceLocation::File { .. } => None,
        }
    }

    /// Human-readable fetch target
    pub fn describe(&self) -> String {
        match self {
            SourceLocation::GoogleSheet { .. } => self.export_url().unwrap_or_default(),
            SourceLocation::File { path } => path.display().to_string(),
        }
    }
}

/// One registered source: a stable key, its location and its header row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocator {
    pub key: String,
    pub location: SourceLocation,
    /// Zero-based row holding the column names; rows above it are skipped
    pub header_row: usize,
}

/// One row of the `sources` listing, with the location actually fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceListing {
    pub key: String,
    pub header_row: usize,
    pub location: String,
}

impl From<&SourceLocator> for SourceListing {
    fn from(source: &SourceLocator) -> Self {
        Self {
            key: source.key.clone(),
            header_row: source.header_row,
            location: source.location.describe(),
        }
    }
}

/// Entry of a registry file
#[derive(Debug, Clone, Deserialize)]
struct RegistryEntry {
    key: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    header_row: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
struct RegistryFile {
    sources: Vec<RegistryEntry>,
}

/// Ordered source registry; processing order is registry order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registry {
    sources: Vec<SourceLocator>,
}

impl Registry {
    pub fn new(sources: Vec<SourceLocator>) -> Result<Self> {
        let mut keys = HashSet::new();
        for source in &sources {
            if !keys.insert(source.key.as_str()) {
                return Err(Error::InvalidLocator(format!(
                    "source key '{}' registered twice",
                    source.key
                )));
            }
        }
        Ok(Self { sources })
    }

    /// The yearly Google Sheets
    pub fn builtin() -> Result<Self> {
        let sources = GOOGLE_SHEETS
            .iter()
            .map(|(key, url)| {
                Ok(SourceLocator {
                    key: key.to_string(),
                    location: SourceLocation::from_sheet_url(url)?,
                    header_row: default_header_row(key),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(sources)
    }

    /// Load a registry file. Relative file paths resolve against the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json_str(&content, base)
    }

    fn from_json_str(content: &str, base: &Path) -> Result<Self> {
        let file: RegistryFile = serde_json::from_str(content)?;
        let sources = file
            .sources
            .into_iter()
            .map(|entry| {
                let location = match (&entry.url, &entry.path) {
                    (Some(url), None) => SourceLocation::from_sheet_url(url)?,
                    (None, Some(p)) => SourceLocation::File {
                        path: if p.is_absolute() { p.clone() } else { base.join(p) },
                    },
                    _ => {
                        return Err(Error::InvalidLocator(format!(
                            "source '{}' needs exactly one of 'url' or 'path'",
                            entry.key
                        )))
                    }
                };
                let header_row = entry
                    .header_row
                    .unwrap_or_else(|| default_header_row(&entry.key));
                Ok(SourceLocator {
                    key: entry.key,
                    location,
                    header_row,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(sources)
    }

    pub fn sources(&self) -> &[SourceLocator] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Resolved fetch location of every source, in registry order
    pub fn listing(&self) -> Vec<SourceListing> {
        self.sources.iter().map(SourceListing::from).collect()
    }
}

fn default_header_row(key: &str) -> usize {
    HEADER_ROW_OVERRIDES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, row)| *row)
        .unwrap_or(DEFAULT_HEADER_ROW)
}
