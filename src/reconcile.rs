use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::ReconcileConfig;
use crate::error::Error;
use crate::fetch::SourceFetcher;
use crate::inference::{coerce_date, is_placeholder};
use crate::normalize::{
    clean_columns, normalize_text, rename_after_column, strip_structural_suffix, ValueMap,
};
use crate::registry::{Registry, SourceLocator};
use crate::table::Table;
use crate::types::{MergePolicy, Result, SourceOutcome, SourceStatus, Value};

/// Per-source cleanup pipeline, built once from an immutable configuration
pub struct Reconciler<'a> {
    config: &'a ReconcileConfig,
    rename: HashMap<String, String>,
    victim_rename: HashMap<String, String>,
    perpetrator_rename: HashMap<String, String>,
    regions: ValueMap,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a ReconcileConfig) -> Self {
        Self {
            config,
            rename: config.rename_lookup(),
            victim_rename: config.victim_lookup(),
            perpetrator_rename: config.perpetrator_lookup(),
            regions: ValueMap::new(&config.region_map),
        }
    }

    /// Turn one raw source table into rows ready for the canonical table
    pub fn reconcile_source(&self, mut table: Table) -> Result<Table> {
        let config = self.config;

        // raw header cleanup
        table.map_columns(|c| strip_structural_suffix(c));
        table.retain_columns(|c| !c.is_empty());
        table.map_cells(|cell| match cell {
            Some(Value::Text(s)) if is_placeholder(&s) => None,
            other => other,
        });

        clean_columns(&mut table);
        // headers made only of short tokens ("N°") carry no field name
        table.retain_columns(|c| !c.is_empty());
        table.rename_columns(&self.rename);

        self.parse_dates(&mut table)?;

        table.map_cells(|cell| cell.map(normalize_text));

        table.rename_columns(&self.perpetrator_rename);
        let suffixed = rename_after_column(
            table.columns(),
            &config.pivot_column,
            &config.perpetrator_suffix,
        );
        table.set_columns(suffixed);
        table.rename_columns(&self.victim_rename);

        let prefix = config.unnamed_prefix.as_str();
        table.retain_columns(|c| !c.starts_with(prefix));

        let region_idx = table
            .column_index(&config.region_column)
            .ok_or_else(|| Error::missing_column(&config.region_column))?;
        table.map_column_at(region_idx, |cell| self.regions.canonicalize(cell));

        self.merge_classification(&mut table)?;

        if table.truncate_after(&config.terminal_column) {
            debug!(column = %config.terminal_column, "truncated trailing columns");
        }

        table.drop_empty_rows();

        if let Some(column) = table.first_duplicate_column() {
            return Err(Error::DuplicateColumn {
                column: column.to_string(),
            });
        }

        Ok(table)
    }

    /// Parse the date column day-first and drop rows without a usable date
    fn parse_dates(&self, table: &mut Table) -> Result<()> {
        let column = &self.config.date_column;
        let idx = table
            .column_index(column)
            .ok_or_else(|| Error::missing_column(column))?;

        table.map_column_at(idx, |cell| coerce_date(cell).map(Value::Date));

        let before = table.row_count();
        table.retain_rows(|row| row[idx].is_some());
        let dropped = before - table.row_count();
        if dropped > 0 {
            debug!(dropped, %column, "dropped rows without a valid date");
        }
        Ok(())
    }

    /// Fill the canonical classification from the legacy column, then drop the legacy column
    fn merge_classification(&self, table: &mut Table) -> Result<()> {
        let canonical_name = &self.config.classification_column;
        let legacy_name = &self.config.legacy_classification_column;
        let canonical = table.column_index(canonical_name);
        let legacy = table.column_index(legacy_name);

        match (canonical, legacy, self.config.merge_policy) {
            (Some(target), Some(source), _) => {
                table.fill_missing_from(target, source);
                table.drop_column(legacy_name);
            }
            (None, _, MergePolicy::Strict) => return Err(Error::missing_column(canonical_name)),
            (_, None, MergePolicy::Strict) => return Err(Error::missing_column(legacy_name)),
            (None, Some(_), MergePolicy::Lenient) => {
                let canonical_name = canonical_name.clone();
                table.map_columns(|c| {
                    if c == legacy_name {
                        canonical_name.clone()
                    } else {
                        c.clone()
                    }
                });
            }
            (_, None, MergePolicy::Lenient) => {}
        }
        Ok(())
    }
}

/// Canonical table plus the outcome of every source, in registry order
#[derive(Debug, Clone, Default)]
pub struct Consolidation {
    pub table: Table,
    pub outcomes: Vec<SourceOutcome>,
}

impl Consolidation {
    pub fn loaded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_loaded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.loaded_count()
    }

    /// Record one source result; loaded rows are appended after all earlier sources
    fn absorb(mut self, source: &SourceLocator, result: Result<Table>) -> Self {
        let status = match result {
            Ok(table) => {
                let rows = table.row_count();
                info!(source = %source.key, rows, "loaded source");
                self.table.append(table);
                SourceStatus::Loaded { rows }
            }
            Err(e) => {
                warn!(source = %source.key, error = %e, "skipping source");
                SourceStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.outcomes.push(SourceOutcome {
            key: source.key.clone(),
            status,
        });
        self
    }
}

/// Fetch and reconcile one source
pub fn load_source(
    source: &SourceLocator,
    fetcher: &dyn SourceFetcher,
    reconciler: &Reconciler<'_>,
) -> Result<Table> {
    let raw = fetcher.fetch(source)?;
    debug!(
        source = %source.key,
        rows = raw.row_count(),
        columns = raw.column_count(),
        "fetched raw table"
    );
    reconciler.reconcile_source(raw)
}

/// Fold every registered source into one canonical table.
///
/// A failing source is recorded and skipped; it never stops the remaining sources.
pub fn consolidate(
    registry: &Registry,
    fetcher: &dyn SourceFetcher,
    config: &ReconcileConfig,
) -> Consolidation {
    let reconciler = Reconciler::new(config);
    let consolidation = registry
        .sources()
        .iter()
        .fold(Consolidation::default(), |acc, source| {
            let result = load_source(source, fetcher, &reconciler);
            acc.absorb(source, result)
        });

    info!(
        loaded = consolidation.loaded_count(),
        failed = consolidation.failed_count(),
        rows = consolidation.table.row_count(),
        columns = consolidation.table.column_count(),
        "consolidation finished"
    );
    consolidation
}
