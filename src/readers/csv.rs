use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;

use crate::error::Error;
use crate::inference::is_missing;
use crate::table::Table;
use crate::types::{Result, Value};

use super::TableReader;

/// CSV/TSV file reader
pub struct CsvReader {
    path: PathBuf,
    delimiter: u8,
}

impl CsvReader {
    /// Create a new CSV reader
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            delimiter: b',',
        })
    }

    /// Create a new TSV reader
    pub fn new_tsv(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            delimiter: b'\t',
        })
    }
}

impl TableReader for CsvReader {
    fn read_table(&mut self, header_row: usize) -> Result<Table> {
        let file = File::open(&self.path)?;
        read_delimited(BufReader::new(file), self.delimiter, header_row)
    }
}

/// Decode delimited text into a table.
///
/// The first `header_row` records are banner rows and are skipped; the next
/// record names the columns. Missing-value tokens become `None`.
pub fn read_delimited<R: Read>(input: R, delimiter: u8, header_row: usize) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut records = reader.records().skip(header_row);

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|h| h.to_string()).collect(),
        None => {
            return Err(Error::InvalidInput(format!(
                "no header at row {}",
                header_row + 1
            )))
        }
    };

    let mut table = Table::new(headers);
    for result in records {
        let record = result?;
        let row = record
            .iter()
            .map(|field| {
                if is_missing(field) {
                    None
                } else {
                    Some(Value::text(field))
                }
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}
