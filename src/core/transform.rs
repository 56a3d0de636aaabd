//! Relabel the fetched columns and aggregate them to hourly averages.

use std::collections::HashSet;

use crate::{
    core::{
        error::Warning,
        series::HourlyBuckets,
        table::{Column, ColumnKey, DisplayTable, GenerationTable, HourlyTable, Table},
    },
    prelude::*,
};

/// Number of levels in a fetched column key: plant, fuel type and metric.
const N_FETCHED_LEVELS: usize = 3;

/// Names of the levels kept by [`relabel`].
pub const LEVEL_NAMES: [&str; 2] = ["Plant", "Fuel type"];

/// Display format of the hourly index.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[must_use]
pub struct Transformed {
    /// Hourly averages for export.
    pub hourly: HourlyTable,

    /// The same averages with the index as text, for the screen only.
    pub display: DisplayTable,

    pub warnings: Vec<Warning>,
}

/// Relabel, aggregate and derive the display view.
#[instrument(skip_all, fields(n_rows = table.n_rows(), n_columns = table.n_columns()))]
pub fn transform(table: GenerationTable) -> Result<Transformed> {
    let (table, warnings) = relabel(table);
    for warning in &warnings {
        warn!(%warning, "relabeling");
    }
    let hourly = resample_hourly_mean(&table)?;
    debug!(n_hours = hourly.n_rows(), "aggregated");
    let display = hourly.map_index(|timestamp| timestamp.format(DISPLAY_FORMAT).to_string());
    Ok(Transformed { hourly, display, warnings })
}

/// Keep the plant and fuel type levels of the fetched column keys.
///
/// Tables whose keys are not all three-level composites are returned as is.
pub fn relabel<I>(table: Table<I>) -> (Table<I>, Vec<Warning>) {
    let n_levels = table.n_levels();
    if n_levels != Some(N_FETCHED_LEVELS) {
        return (table, vec![Warning::SchemaAssumption { n_levels }]);
    }

    let mut seen = HashSet::with_capacity(table.n_columns());
    let mut n_duplicates = 0;
    let level_names = LEVEL_NAMES.map(String::from).to_vec();
    let table = table.map_keys(level_names, |key| {
        let key = ColumnKey(key.0.into_iter().take(LEVEL_NAMES.len()).collect());
        if !seen.insert(key.clone()) {
            n_duplicates += 1;
        }
        key
    });

    let warnings = if n_duplicates == 0 {
        Vec::new()
    } else {
        vec![Warning::DuplicateColumns { n_duplicates }]
    };
    (table, warnings)
}

/// Average every column over each clock hour, ignoring absent values.
pub fn resample_hourly_mean(table: &GenerationTable) -> Result<HourlyTable> {
    let buckets = HourlyBuckets::try_from_index(table.index())?;
    let columns = table
        .columns()
        .iter()
        .map(|column| Column { key: column.key.clone(), values: buckets.mean(&column.values) })
        .collect();
    Table::try_new(table.level_names().to_vec(), buckets.hours, columns)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, TimeDelta, TimeZone};
    use chrono_tz::{Europe::Prague, Tz};

    use super::*;

    fn quarter_hours(n: i64) -> Vec<DateTime<Tz>> {
        let start = Prague.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + TimeDelta::minutes(15 * i)).collect()
    }

    fn fetched_table() -> GenerationTable {
        let index = quarter_hours(4);
        Table::try_new(
            Vec::new(),
            index,
            vec![
                Column {
                    key: ColumnKey::new(["Temelin 1", "Nuclear", "Actual Aggregated"]),
                    values: vec![Some(10.0), None, Some(30.0), None],
                },
                Column {
                    key: ColumnKey::new(["Dukovany 2", "Nuclear", "Actual Aggregated"]),
                    values: vec![None; 4],
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_relabel_drops_metric_level() {
        let (table, warnings) = relabel(fetched_table());
        assert!(warnings.is_empty());
        assert_eq!(table.level_names(), ["Plant", "Fuel type"]);
        let keys = table.columns().iter().map(|column| column.key.clone()).collect::<Vec<_>>();
        assert_eq!(
            keys,
            [ColumnKey::new(["Temelin 1", "Nuclear"]), ColumnKey::new(["Dukovany 2", "Nuclear"])],
        );
    }

    #[test]
    fn test_relabel_skips_unexpected_schema() {
        let table = Table::try_new(
            Vec::new(),
            vec![1],
            vec![Column { key: ColumnKey::new(["Temelin 1", "Nuclear"]), values: vec![None] }],
        )
        .unwrap();
        let (relabeled, warnings) = relabel(table.clone());
        assert_eq!(relabeled, table);
        assert_eq!(warnings, [Warning::SchemaAssumption { n_levels: Some(2) }]);
    }

    #[test]
    fn test_relabel_reports_duplicates() {
        let table = Table::try_new(
            Vec::new(),
            vec![1],
            vec![
                Column {
                    key: ColumnKey::new(["Dalesice", "Hydro Pumped Storage", "Actual Aggregated"]),
                    values: vec![Some(1.0)],
                },
                Column {
                    key: ColumnKey::new(["Dalesice", "Hydro Pumped Storage", "Actual Consumption"]),
                    values: vec![Some(2.0)],
                },
            ],
        )
        .unwrap();
        let (relabeled, warnings) = relabel(table);
        assert_eq!(relabeled.n_columns(), 2);
        assert_eq!(warnings, [Warning::DuplicateColumns { n_duplicates: 1 }]);
    }

    #[test]
    fn test_transform_averages_present_values() -> Result {
        let transformed = transform(fetched_table())?;
        assert!(transformed.warnings.is_empty());
        assert_eq!(transformed.hourly.n_rows(), 1);
        assert_abs_diff_eq!(transformed.hourly.get(0, 0).unwrap(), 20.0);
        assert_eq!(transformed.hourly.get(0, 1), None);
        assert_eq!(transformed.display.index(), ["2024-01-01 00:00:00"]);
        Ok(())
    }

    #[test]
    fn test_full_day_has_24_hours() -> Result {
        let index = quarter_hours(96);
        let values = (0..96_i32).map(|i| Some(f64::from(i))).collect();
        let table = Table::try_new(
            Vec::new(),
            index,
            vec![Column {
                key: ColumnKey::new(["Prunerov 2", "Fossil Brown coal/Lignite", "Actual Aggregated"]),
                values,
            }],
        )?;
        let transformed = transform(table)?;
        assert_eq!(transformed.hourly.n_rows(), 24);
        assert_eq!(transformed.hourly.n_columns(), 1);
        assert_abs_diff_eq!(transformed.hourly.get(0, 0).unwrap(), 1.5);
        assert_abs_diff_eq!(transformed.hourly.get(23, 0).unwrap(), 93.5);
        Ok(())
    }

    #[test]
    fn test_transform_empty() -> Result {
        let transformed = transform(GenerationTable::empty())?;
        assert!(transformed.hourly.is_empty());
        assert!(transformed.display.is_empty());
        Ok(())
    }
}
