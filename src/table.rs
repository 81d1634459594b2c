use std::collections::{HashMap, HashSet};

use crate::types::Value;

/// A table of named columns and rows of optional values.
///
/// Column names may repeat while a source is being cleaned; the accumulator
/// only ever receives tables with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Value>>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows, padding or cutting each row to the column count
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<Value>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<Value>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<Option<Value>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Index of the first column with this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of the first column with this name
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = Option<&Value>>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| row[idx].as_ref()))
    }

    /// Replace every column name through `f`
    pub fn map_columns<F>(&mut self, f: F)
    where
        F: FnMut(&String) -> String,
    {
        self.columns = self.columns.iter().map(f).collect();
    }

    pub fn set_columns(&mut self, columns: Vec<String>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }

    /// Rename every column found in `mapping`; others keep their name
    pub fn rename_columns(&mut self, mapping: &HashMap<String, String>) {
        self.map_columns(|c| mapping.get(c).cloned().unwrap_or_else(|| c.clone()));
    }

    /// Keep only the columns for which `keep` returns true
    pub fn retain_columns<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        let mask: Vec<bool> = self.columns.iter().map(|c| keep(c)).collect();
        if mask.iter().all(|k| *k) {
            return;
        }
        self.columns = filter_by_mask(std::mem::take(&mut self.columns), &mask);
        for row in &mut self.rows {
            *row = filter_by_mask(std::mem::take(row), &mask);
        }
    }

    /// Drop every column with this name
    pub fn drop_column(&mut self, name: &str) {
        self.retain_columns(|c| c != name);
    }

    /// Keep columns up to and including the first column named `name`.
    /// Returns false when no such column exists.
    pub fn truncate_after(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.truncate(idx + 1);
        for row in &mut self.rows {
            row.truncate(idx + 1);
        }
        true
    }

    /// Apply `f` to every cell
    pub fn map_cells<F>(&mut self, mut f: F)
    where
        F: FnMut(Option<Value>) -> Option<Value>,
    {
        for row in &mut self.rows {
            for cell in row.iter_mut() {
                *cell = f(cell.take());
            }
        }
    }

    /// Apply `f` to every cell of the column at `idx`
    pub fn map_column_at<F>(&mut self, idx: usize, mut f: F)
    where
        F: FnMut(Option<Value>) -> Option<Value>,
    {
        for row in &mut self.rows {
            row[idx] = f(row[idx].take());
        }
    }

    /// Fill missing cells of column `target` with the value of column `source`
    pub fn fill_missing_from(&mut self, target: usize, source: usize) {
        for row in &mut self.rows {
            if row[target].is_none() {
                row[target] = row[source].clone();
            }
        }
    }

    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Vec<Option<Value>>) -> bool,
    {
        self.rows.retain(keep);
    }

    /// Drop rows where every cell is missing
    pub fn drop_empty_rows(&mut self) {
        self.rows.retain(|row| row.iter().any(Option::is_some));
    }

    /// First column name that occurs more than once
    pub fn first_duplicate_column(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .find(|c| !seen.insert(c.as_str()))
            .map(String::as_str)
    }

    /// Append the rows of `other`, extending the column set with names seen
    /// for the first time. Existing rows get missing values in new columns.
    ///
    /// `other` must have unique column names.
    pub fn append(&mut self, other: Table) {
        let mut positions = Vec::with_capacity(other.columns.len());
        let mut added = 0;
        for name in &other.columns {
            match self.column_index(name) {
                Some(idx) => positions.push(idx),
                None => {
                    self.columns.push(name.clone());
                    positions.push(self.columns.len() - 1);
                    added += 1;
                }
            }
        }

        if added > 0 {
            let width = self.columns.len();
            for row in &mut self.rows {
                row.resize(width, None);
            }
        }

        let width = self.columns.len();
        for row in other.rows {
            let mut merged = vec![None; width];
            for (cell, &pos) in row.into_iter().zip(&positions) {
                merged[pos] = cell;
            }
            self.rows.push(merged);
        }
    }
}

fn filter_by_mask<T>(items: Vec<T>, mask: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(mask)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<Value> {
        Some(Value::text(s))
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = Table::from_rows(cols(&["a", "b", "c"]), vec![vec![text("1")]]);
        assert_eq!(table.rows()[0], vec![text("1"), None, None]);
    }

    #[test]
    fn test_retain_columns_keeps_rows_aligned() {
        let mut table = Table::from_rows(
            cols(&["a", "", "c"]),
            vec![vec![text("1"), text("x"), text("3")]],
        );
        table.retain_columns(|c| !c.is_empty());
        assert_eq!(table.columns(), &cols(&["a", "c"])[..]);
        assert_eq!(table.rows()[0], vec![text("1"), text("3")]);
    }

    #[test]
    fn test_truncate_after_first_occurrence() {
        let mut table = Table::from_rows(
            cols(&["a", "end", "b", "end"]),
            vec![vec![text("1"), text("2"), text("3"), text("4")]],
        );
        assert!(table.truncate_after("end"));
        assert_eq!(table.columns(), &cols(&["a", "end"])[..]);
        assert_eq!(table.rows()[0].len(), 2);
        assert!(!table.truncate_after("missing"));
    }

    #[test]
    fn test_drop_empty_rows() {
        let mut table = Table::from_rows(
            cols(&["a", "b"]),
            vec![vec![None, None], vec![None, text("x")]],
        );
        table.drop_empty_rows();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_fill_missing_from() {
        let mut table = Table::from_rows(
            cols(&["new", "old"]),
            vec![vec![None, text("a")], vec![text("b"), text("c")]],
        );
        table.fill_missing_from(0, 1);
        assert_eq!(table.rows()[0][0], text("a"));
        assert_eq!(table.rows()[1][0], text("b"));
    }

    #[test]
    fn test_first_duplicate_column() {
        let table = Table::new(cols(&["a", "b", "a"]));
        assert_eq!(table.first_duplicate_column(), Some("a"));
        let table = Table::new(cols(&["a", "b"]));
        assert_eq!(table.first_duplicate_column(), None);
    }

    #[test]
    fn test_append_unions_columns_in_order() {
        let mut acc = Table::default();
        acc.append(Table::from_rows(cols(&["a", "b"]), vec![vec![text("1"), text("2")]]));
        acc.append(Table::from_rows(cols(&["b", "c"]), vec![vec![text("3"), text("4")]]));

        assert_eq!(acc.columns(), &cols(&["a", "b", "c"])[..]);
        assert_eq!(acc.rows()[0], vec![text("1"), text("2"), None]);
        assert_eq!(acc.rows()[1], vec![None, text("3"), text("4")]);
    }
}
