pub mod csv;
pub mod excel;

use std::path::Path;

use crate::table::Table;
use crate::types::{FileFormat, Result};

/// Common trait for spreadsheet readers
pub trait TableReader {
    /// Read the sheet, taking column names from the zero-based `header_row`
    fn read_table(&mut self, header_row: usize) -> Result<Table>;
}

/// Create a reader for the given file path
pub fn create_reader(path: &Path) -> Result<Box<dyn TableReader>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let format = FileFormat::from_extension(ext).ok_or_else(|| {
        crate::error::Error::UnsupportedFormat(format!(
            "Unsupported file extension: .{}",
            ext
        ))
    })?;

    match format {
        FileFormat::Csv => Ok(Box::new(csv::CsvReader::new(path)?)),
        FileFormat::Tsv => Ok(Box::new(csv::CsvReader::new_tsv(path)?)),
        FileFormat::Excel => Ok(Box::new(excel::ExcelReader::new(path)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_create_reader_tsv() {
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        write!(file, "a\tb\n1\t2\n").unwrap();

        let table = create_reader(file.path()).unwrap().read_table(0).unwrap();
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn test_create_reader_unsupported() {
        assert!(create_reader(Path::new("data.pkl")).is_err());
    }
}
