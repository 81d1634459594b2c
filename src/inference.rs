use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::Value;

/// Cell texts read as missing when a sheet is decoded
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// Day-first formats, tried in order. Month-first is the fallback for values
// whose first field cannot be a day.
const DAY_FIRST_LONG_YEAR: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y", "%m-%d-%Y"];
const DAY_FIRST_SHORT_YEAR: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%m/%d/%y"];
const YEAR_FIRST: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DAY_FIRST_WITH_TIME: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const ISO_WITH_TIME: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

static DATE_PATTERNS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        // 15/01/2024, 15-01-2024, 15.01.2024
        (
            Regex::new(r"^\d{1,2}[/.\-]\d{1,2}[/.\-]\d{4}$").unwrap(),
            DAY_FIRST_LONG_YEAR,
        ),
        // 15/01/24
        (
            Regex::new(r"^\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2}$").unwrap(),
            DAY_FIRST_SHORT_YEAR,
        ),
        // ISO: 2024-01-15, 2024/01/15
        (
            Regex::new(r"^\d{4}[/.\-]\d{1,2}[/.\-]\d{1,2}$").unwrap(),
            YEAR_FIRST,
        ),
    ]
});

static DATETIME_PATTERNS: Lazy<Vec<(Regex, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"^\d{1,2}/\d{1,2}/\d{4} \d{1,2}:\d{2}(:\d{2})?$").unwrap(),
            DAY_FIRST_WITH_TIME,
        ),
        (
            Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?$").unwrap(),
            ISO_WITH_TIME,
        ),
    ]
});

/// Physical kind of a column, used when writing the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

/// Check if a cell text represents a missing value
pub fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value.trim())
}

/// Check if a cell is whitespace-only or a lone hyphen placeholder
pub fn is_placeholder(value: &str) -> bool {
    value == "-" || value.trim().is_empty()
}

/// Parse a numeric value
pub fn parse_numeric(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse::<f64>().ok()
}

/// Coerce a cell to a number; anything unparseable becomes missing
pub fn coerce_numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => Some(*n),
        Value::Text(s) => parse_numeric(s),
        Value::Date(_) => None,
    }
}

/// Parse a date written day-first
pub fn parse_date_dayfirst(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for (pattern, formats) in DATE_PATTERNS.iter() {
        if pattern.is_match(trimmed) {
            return formats
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok());
        }
    }

    for (pattern, formats) in DATETIME_PATTERNS.iter() {
        if pattern.is_match(trimmed) {
            return formats
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
                .map(|dt| dt.date());
        }
    }

    None
}

/// Convert an Excel serial day number to a date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (with the 1900 leap year bug)
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial as i64))
}

/// Coerce a cell to a date; `None` means the row has no usable date
pub fn coerce_date(value: Option<Value>) -> Option<NaiveDate> {
    match value? {
        Value::Date(d) => Some(d),
        Value::Text(s) => parse_date_dayfirst(&s),
        Value::Number(n) => excel_serial_to_date(n),
    }
}

/// Infer the physical kind of a column from its present values
pub fn infer_kind<'a, I>(values: I) -> ColumnKind
where
    I: IntoIterator<Item = Option<&'a Value>>,
{
    let mut kind: Option<ColumnKind> = None;
    for value in values.into_iter().flatten() {
        let this = match value {
            Value::Text(_) => return ColumnKind::Text,
            Value::Number(_) => ColumnKind::Number,
            Value::Date(_) => ColumnKind::Date,
        };
        match kind {
            None => kind = Some(this),
            Some(k) if k != this => return ColumnKind::Text,
            Some(_) => {}
        }
    }
    kind.unwrap_or(ColumnKind::Text)
}
