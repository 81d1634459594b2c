use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::inference::{coerce_numeric, infer_kind, ColumnKind};
use crate::table::Table;
use crate::types::{Value, DASHBOARD_COLUMNS};

/// Distinct values tracked per column before reporting high cardinality
pub const MAX_TRACKED_UNIQUE: usize = 2000;

/// Welford's online algorithm for computing mean and variance in O(1) memory
#[derive(Debug, Clone)]
pub struct WelfordStats {
    count: u64,
    mean: f64,
    m2: f64, // Sum of squares of differences from current mean
    min: Option<f64>,
    max: Option<f64>,
}

impl WelfordStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: None,
            max: None,
        }
    }

    pub fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    pub fn std_dev(&self) -> Option<f64> {
        (self.count > 1).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }
}

impl Default for WelfordStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric summary of the values in a column that parse as numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: u64,
    pub mean: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    fn from_welford(stats: &WelfordStats) -> Option<Self> {
        Some(Self {
            count: stats.count(),
            mean: stats.mean()?,
            std_dev: stats.std_dev(),
            min: stats.min()?,
            max: stats.max()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredKind {
    Text,
    Number,
    Date,
}

impl From<ColumnKind> for StoredKind {
    fn from(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => StoredKind::Text,
            ColumnKind::Number => StoredKind::Number,
            ColumnKind::Date => StoredKind::Date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: StoredKind,
    pub present: usize,
    pub missing: usize,
    /// `None` once the column holds more than `MAX_TRACKED_UNIQUE` distinct values
    pub unique: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_date: Option<String>,
}

/// Which dashboard columns the table carries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardCoverage {
    pub present: Vec<String>,
    pub absent: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    pub dashboard: DashboardCoverage,
}

/// Capped unique value tracker that stops tracking after hitting a limit
#[derive(Debug, Clone)]
struct CappedUniqueTracker {
    values: HashSet<String>,
    max_values: usize,
    high_cardinality: bool,
}

impl CappedUniqueTracker {
    fn new(max_values: usize) -> Self {
        Self {
            values: HashSet::new(),
            max_values,
            high_cardinality: false,
        }
    }

    fn add(&mut self, value: String) {
        if self.high_cardinality {
            return;
        }
        self.values.insert(value);
        if self.values.len() > self.max_values {
            self.high_cardinality = true;
            self.values.clear();
        }
    }

    fn unique_count(&self) -> Option<usize> {
        (!self.high_cardinality).then_some(self.values.len())
    }
}

fn summarize_column(table: &Table, idx: usize) -> ColumnSummary {
    let values = || table.rows().iter().map(move |row| row[idx].as_ref());

    let mut welford = WelfordStats::new();
    let mut unique = CappedUniqueTracker::new(MAX_TRACKED_UNIQUE);
    let mut present = 0;
    let mut first_date: Option<NaiveDate> = None;
    let mut last_date: Option<NaiveDate> = None;

    for value in values().flatten() {
        present += 1;
        unique.add(value.render());
        if let Some(n) = coerce_numeric(Some(value)) {
            welford.update(n);
        }
        if let Value::Date(d) = value {
            first_date = Some(first_date.map_or(*d, |f| f.min(*d)));
            last_date = Some(last_date.map_or(*d, |l| l.max(*d)));
        }
    }

    ColumnSummary {
        name: table.columns()[idx].clone(),
        kind: infer_kind(values()).into(),
        present,
        missing: table.row_count() - present,
        unique: unique.unique_count(),
        numeric: NumericSummary::from_welford(&welford),
        first_date: first_date.map(|d| d.format("%Y-%m-%d").to_string()),
        last_date: last_date.map(|d| d.format("%Y-%m-%d").to_string()),
    }
}

/// Check the table against the columns the dashboard reads
pub fn dashboard_coverage(table: &Table) -> DashboardCoverage {
    let (present, absent): (Vec<&str>, Vec<&str>) = DASHBOARD_COLUMNS
        .iter()
        .copied()
        .partition(|name| table.has_column(name));
    DashboardCoverage {
        present: present.into_iter().map(String::from).collect(),
        absent: absent.into_iter().map(String::from).collect(),
    }
}

/// Summarize every column of a table
pub fn summarize(table: &Table) -> TableSummary {
    TableSummary {
        rows: table.row_count(),
        columns: (0..table.column_count())
            .map(|idx| summarize_column(table, idx))
            .collect(),
        dashboard: dashboard_coverage(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let d1 = NaiveDate::from_ymd_opt(2019, 3, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2018, 7, 1).unwrap();
        Table::from_rows(
            vec![
                "fecha".to_string(),
                "edad_victima".to_string(),
                "region".to_string(),
            ],
            vec![
                vec![
                    Some(Value::Date(d1)),
                    Some(Value::text("34")),
                    Some(Value::text("metropolitana")),
                ],
                vec![
                    Some(Value::Date(d2)),
                    Some(Value::text("sin informacion")),
                    Some(Value::text("metropolitana")),
                ],
                vec![Some(Value::Date(d1)), Some(Value::Number(20.0)), None],
            ],
        )
    }

    #[test]
    fn test_welford_basic() {
        let mut stats = WelfordStats::new();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.update(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean().unwrap() - 3.0).abs() < 1e-10);
        assert!((stats.std_dev().unwrap() - 2.5f64.sqrt()).abs() < 1e-10);
        assert_eq!(stats.min(), Some(1.0));
        assert_eq!(stats.max(), Some(5.0));
    }

    #[test]
    fn test_welford_single_value() {
        let mut stats = WelfordStats::new();
        stats.update(42.0);

        assert_eq!(stats.mean(), Some(42.0));
        assert!(stats.std_dev().is_none()); // Need at least 2 values
    }

    #[test]
    fn test_capped_unique_tracker_overflow() {
        let mut tracker = CappedUniqueTracker::new(3);
        for v in ["a", "b", "a", "c"] {
            tracker.add(v.to_string());
        }
        assert_eq!(tracker.unique_count(), Some(3));

        tracker.add("d".to_string());
        assert_eq!(tracker.unique_count(), None);
    }

    #[test]
    fn test_summarize_columns() {
        let summary = summarize(&sample());
        assert_eq!(summary.rows, 3);

        let fecha = &summary.columns[0];
        assert_eq!(fecha.kind, StoredKind::Date);
        assert_eq!(fecha.unique, Some(2));
        assert_eq!(fecha.first_date.as_deref(), Some("2018-07-01"));
        assert_eq!(fecha.last_date.as_deref(), Some("2019-03-05"));
        assert!(fecha.numeric.is_none());

        // numbers are summarized even when the column also holds text
        let edad = &summary.columns[1];
        assert_eq!(edad.kind, StoredKind::Text);
        let numeric = edad.numeric.as_ref().unwrap();
        assert_eq!(numeric.count, 2);
        assert!((numeric.mean - 27.0).abs() < 1e-10);

        let region = &summary.columns[2];
        assert_eq!(region.present, 2);
        assert_eq!(region.missing, 1);
        assert_eq!(region.unique, Some(1));
    }

    #[test]
    fn test_dashboard_coverage() {
        let coverage = dashboard_coverage(&sample());
        assert_eq!(coverage.present, vec!["fecha", "region", "edad_victima"]);
        assert!(coverage.absent.contains(&"sentencia".to_string()));
        assert!(!coverage.absent.contains(&"fecha".to_string()));
        assert_eq!(
            coverage.present.len() + coverage.absent.len(),
            DASHBOARD_COLUMNS.len()
        );
    }
}
