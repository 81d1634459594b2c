use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::NaiveDate;

use crate::error::Error;
use crate::inference::{excel_serial_to_date, is_missing};
use crate::table::Table;
use crate::types::{Result, Value};

use super::TableReader;

/// Excel file reader (supports .xlsx, .xls, .xlsm, .xlsb). Reads the first sheet.
pub struct ExcelReader {
    path: PathBuf,
}

impl ExcelReader {
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Convert a header cell to its text
    fn header_text(dt: &Data) -> String {
        match dt {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Float(f) => Value::Number(*f).render(),
            Data::Int(i) => i.to_string(),
            Data::Bool(b) => b.to_string(),
            Data::DateTime(d) => excel_serial_to_date(d.as_f64())
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| d.as_f64().to_string()),
            Data::DateTimeIso(s) => s.clone(),
            Data::DurationIso(s) => s.clone(),
            Data::Error(e) => format!("#{:?}", e),
        }
    }

    /// Convert a data cell to a table value
    fn cell_value(dt: &Data) -> Option<Value> {
        match dt {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) if is_missing(s) => None,
            Data::String(s) => Some(Value::text(s)),
            Data::Float(f) => Some(Value::Number(*f)),
            Data::Int(i) => Some(Value::Number(*i as f64)),
            Data::Bool(b) => Some(Value::Text(b.to_string())),
            Data::DateTime(d) => excel_serial_to_date(d.as_f64()).map(Value::Date),
            Data::DateTimeIso(s) => Some(
                s.get(..10)
                    .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
                    .map(Value::Date)
                    .unwrap_or_else(|| Value::text(s)),
            ),
            Data::DurationIso(s) => Some(Value::text(s)),
        }
    }
}

impl TableReader for ExcelReader {
    fn read_table(&mut self, header_row: usize) -> Result<Table> {
        let mut workbook: Sheets<std::io::BufReader<std::fs::File>> =
            open_workbook_auto(&self.path)?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::InvalidInput(format!("{} has no sheets", self.path.display())))?;

        let range = workbook.worksheet_range(&sheet_name).map_err(Error::Excel)?;

        let mut rows = range.rows().skip(header_row);
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(Self::header_text).collect())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "sheet '{}' has no header at row {}",
                    sheet_name,
                    header_row + 1
                ))
            })?;

        let mut table = Table::new(headers);
        for row in rows {
            table.push_row(row.iter().map(Self::cell_value).collect());
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_text() {
        assert_eq!(ExcelReader::header_text(&Data::Empty), "");
        assert_eq!(
            ExcelReader::header_text(&Data::String("Región".to_string())),
            "Región"
        );
        assert_eq!(ExcelReader::header_text(&Data::Float(2015.0)), "2015");
    }

    #[test]
    fn test_cell_value() {
        assert_eq!(ExcelReader::cell_value(&Data::Empty), None);
        assert_eq!(
            ExcelReader::cell_value(&Data::String("NA".to_string())),
            None
        );
        assert_eq!(
            ExcelReader::cell_value(&Data::Float(34.0)),
            Some(Value::Number(34.0))
        );
        assert_eq!(
            ExcelReader::cell_value(&Data::Int(7)),
            Some(Value::Number(7.0))
        );
    }

    #[test]
    fn test_iso_datetime_cell() {
        let value = ExcelReader::cell_value(&Data::DateTimeIso("2019-03-05T10:00:00".to_string()));
        assert_eq!(
            value,
            Some(Value::Date(NaiveDate::from_ymd_opt(2019, 3, 5).unwrap()))
        );
    }

    #[test]
    fn test_missing_file_errors() {
        let mut reader = ExcelReader::new(Path::new("/nonexistent/book.xlsx")).unwrap();
        assert!(reader.read_table(0).is_err());
    }
}
