use std::fmt::{Display, Formatter};

use chrono::DateTime;
use chrono_tz::Tz;
use itertools::Itertools;

use crate::prelude::*;

/// Hierarchical column label, outermost level first.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Hash, derive_more::Deref, derive_more::From)]
pub struct ColumnKey(pub Vec<String>);

impl ColumnKey {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(levels.into_iter().map(Into::into).collect())
    }
}

impl Display for ColumnKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(" / "))
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub key: ColumnKey,

    /// One value per row, `None` when nothing was reported.
    pub values: Vec<Option<f64>>,
}

/// Column-major table of power values indexed by `I`.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Table<I> {
    level_names: Vec<String>,
    index: Vec<I>,
    columns: Vec<Column>,
}

/// Fetched table, sub-hourly rows.
pub type GenerationTable = Table<DateTime<Tz>>;

/// Hourly averages, timezone-aware index.
pub type HourlyTable = Table<DateTime<Tz>>;

/// Hourly averages with the index rendered for the screen.
pub type DisplayTable = Table<String>;

impl<I> Table<I> {
    /// Build a table, checking that every column spans the whole index.
    ///
    /// The level names may be empty, which means the levels are unnamed.
    pub fn try_new(level_names: Vec<String>, index: Vec<I>, columns: Vec<Column>) -> Result<Self> {
        for column in &columns {
            ensure!(
                column.values.len() == index.len(),
                "column `{}` has {} values for {} rows",
                column.key,
                column.values.len(),
                index.len(),
            );
        }
        Ok(Self { level_names, index, columns })
    }

    pub const fn empty() -> Self {
        Self { level_names: Vec::new(), index: Vec::new(), columns: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn index(&self) -> &[I] {
        &self.index
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn level_names(&self) -> &[String] {
        &self.level_names
    }

    /// Number of key levels, if all the columns agree on it.
    #[must_use]
    pub fn n_levels(&self) -> Option<usize> {
        self.columns.iter().map(|column| column.key.len()).all_equal_value().ok()
    }

    /// Number of header rows needed to print the column keys.
    #[must_use]
    pub fn n_header_rows(&self) -> usize {
        self.columns.iter().map(|column| column.key.len()).max().unwrap_or(0)
    }

    /// Name of the key level, or an empty string for unnamed levels.
    #[must_use]
    pub fn level_name(&self, level: usize) -> &str {
        self.level_names.get(level).map_or("", String::as_str)
    }

    /// Value at the row and column.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.columns.get(column).and_then(|column| column.values.get(row).copied().flatten())
    }

    /// Replace the column keys keeping the values.
    pub fn map_keys(
        self,
        level_names: Vec<String>,
        mut f: impl FnMut(ColumnKey) -> ColumnKey,
    ) -> Self {
        let columns = self
            .columns
            .into_iter()
            .map(|Column { key, values }| Column { key: f(key), values })
            .collect();
        Self { level_names, index: self.index, columns }
    }

    /// Replace the index keeping the columns.
    pub fn map_index<J>(&self, f: impl FnMut(&I) -> J) -> Table<J> {
        Table {
            level_names: self.level_names.clone(),
            index: self.index.iter().map(f).collect(),
            columns: self.columns.clone(),
        }
    }
}

impl<I: Ord> Table<I> {
    /// Like [`Table::try_new`], additionally requiring a strictly increasing index.
    pub fn try_new_sorted(
        level_names: Vec<String>,
        index: Vec<I>,
        columns: Vec<Column>,
    ) -> Result<Self> {
        ensure!(
            index.iter().tuple_windows().all(|(lhs, rhs)| lhs < rhs),
            "the index must be strictly increasing",
        );
        Self::try_new(level_names, index, columns)
    }
}
