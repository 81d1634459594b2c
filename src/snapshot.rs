use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use arrow_array::{
    Array, ArrayRef, Date32Array, Float64Array, RecordBatch, RecordBatchOptions, StringArray,
};
use arrow_schema::{DataType, Field, Schema};
use chrono::{Duration, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use sha2::{Digest, Sha256};

use crate::error::Error;
use crate::inference::{infer_kind, ColumnKind};
use crate::table::Table;
use crate::types::{Result, Value};

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn date_to_days(date: NaiveDate) -> i32 {
    (date - unix_epoch()).num_days() as i32
}

fn days_to_date(days: i32) -> Option<NaiveDate> {
    unix_epoch().checked_add_signed(Duration::days(days as i64))
}

/// Build a single record batch; every column is nullable
fn table_to_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.column_count());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.column_count());

    for (idx, name) in table.columns().iter().enumerate() {
        let values = || table.rows().iter().map(move |row| row[idx].as_ref());
        let (data_type, array): (DataType, ArrayRef) = match infer_kind(values()) {
            ColumnKind::Date => (
                DataType::Date32,
                Arc::new(Date32Array::from(
                    values()
                        .map(|v| match v {
                            Some(Value::Date(d)) => Some(date_to_days(*d)),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                )),
            ),
            ColumnKind::Number => (
                DataType::Float64,
                Arc::new(Float64Array::from(
                    values()
                        .map(|v| match v {
                            Some(Value::Number(n)) => Some(*n),
                            _ => None,
                        })
                        .collect::<Vec<_>>(),
                )),
            ),
            ColumnKind::Text => (
                DataType::Utf8,
                Arc::new(StringArray::from(
                    values().map(|v| v.map(Value::render)).collect::<Vec<_>>(),
                )),
            ),
        };
        fields.push(Field::new(name, data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(table.row_count()));
    Ok(RecordBatch::try_new_with_options(schema, arrays, &options)?)
}

/// Write the canonical table as a Parquet snapshot
pub fn write_snapshot(table: &Table, path: &Path) -> Result<()> {
    let batch = table_to_batch(table)?;
    let file = File::create(path)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Load a snapshot back into a table
pub fn read_snapshot(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut table: Option<Table> = None;
    for batch in reader {
        let batch = batch?;
        let target = table.get_or_insert_with(|| {
            Table::new(
                batch
                    .schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().clone())
                    .collect(),
            )
        });

        let columns = batch
            .columns()
            .iter()
            .map(column_values)
            .collect::<Result<Vec<_>>>()?;

        for row_idx in 0..batch.num_rows() {
            target.push_row(columns.iter().map(|c| c[row_idx].clone()).collect());
        }
    }

    match table {
        Some(table) => Ok(table),
        // a snapshot with no row groups still carries its schema
        None => {
            let file = File::open(path)?;
            let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
            Ok(Table::new(
                builder
                    .schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().clone())
                    .collect(),
            ))
        }
    }
}

fn column_values(array: &ArrayRef) -> Result<Vec<Option<Value>>> {
    let len = array.len();
    let values = match array.data_type() {
        DataType::Utf8 => {
            let a = downcast::<StringArray>(array)?;
            (0..len)
                .map(|i| (!a.is_null(i)).then(|| Value::text(a.value(i))))
                .collect()
        }
        DataType::Float64 => {
            let a = downcast::<Float64Array>(array)?;
            (0..len)
                .map(|i| (!a.is_null(i)).then(|| Value::Number(a.value(i))))
                .collect()
        }
        DataType::Date32 => {
            let a = downcast::<Date32Array>(array)?;
            (0..len)
                .map(|i| {
                    if a.is_null(i) {
                        None
                    } else {
                        days_to_date(a.value(i)).map(Value::Date)
                    }
                })
                .collect()
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "unsupported snapshot column type {other}"
            )))
        }
    };
    Ok(values)
}

fn downcast<T: 'static>(array: &ArrayRef) -> Result<&T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::InvalidInput(format!("unexpected array for {}", array.data_type())))
}

/// Compute SHA-256 hash of a file (streaming to handle large files)
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
