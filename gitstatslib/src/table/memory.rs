//! In-memory aggregation table.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::{canonical_key, Filter, GroupKey, KeyPart, Row};
use crate::error::GitStatsError;
use crate::Result;

/// In-memory table of `(value, key)` rows.
///
/// Keys are canonicalized on insert. `inc` looks up an exact-key index, so
/// per-line increments stay cheap even with hundreds of thousands of rows;
/// filters and group-bys scan every row.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    rows: Vec<Row>,
    index: HashMap<Vec<String>, Vec<usize>>,
}

impl MemoryTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from existing rows (kept as-is, including duplicates).
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.push(row);
        }
        table
    }

    fn push(&mut self, row: Row) {
        self.index
            .entry(row.info().to_vec())
            .or_default()
            .push(self.rows.len());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// All rows, in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Append a row without looking for an existing one.
    pub fn add<I>(&mut self, value: f64, info: I)
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        self.push(Row::new(value, info));
    }

    /// Add `value` to the row with this key, or append a new row.
    ///
    /// Fails with [`GitStatsError::AmbiguousKey`] when several rows share
    /// the key, which can only happen after duplicate `add` calls.
    pub fn inc<I>(&mut self, value: f64, info: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        self.inc_key(value, canonical_key(info))
    }

    fn inc_key(&mut self, value: f64, key: Vec<String>) -> Result<()> {
        match self.index.get(&key).map(Vec::as_slice) {
            None | Some([]) => {
                self.push(Row::from_canonical(value, key));
                Ok(())
            }
            Some(&[pos]) => {
                self.rows[pos].add_value(value);
                Ok(())
            }
            Some(matches) => Err(GitStatsError::AmbiguousKey {
                matches: matches.len(),
                key,
            }),
        }
    }

    /// Append every row of `other`.
    pub fn add_table(&mut self, other: &MemoryTable) {
        for row in &other.rows {
            self.push(row.clone());
        }
    }

    /// Increment with every row of `other`.
    pub fn inc_table(&mut self, other: &MemoryTable) -> Result<()> {
        for row in &other.rows {
            self.inc_key(row.value(), row.info().to_vec())?;
        }
        Ok(())
    }

    /// Value of the single row with exactly this key.
    pub fn get<I>(&self, info: I) -> Result<f64>
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        let key = canonical_key(info);
        match self.index.get(&key).map(Vec::as_slice) {
            None | Some([]) => Err(GitStatsError::NotFound { key }),
            Some(&[pos]) => Ok(self.rows[pos].value()),
            Some(matches) => Err(GitStatsError::AmbiguousKey {
                matches: matches.len(),
                key,
            }),
        }
    }

    /// New table with the rows selected by `filter`.
    pub fn filter(&self, filter: &Filter<'_>) -> MemoryTable {
        MemoryTable::from_rows(self.rows.iter().filter(|r| filter.matches(r)).cloned())
    }

    /// Rows whose first dimensions equal `info`.
    pub fn filter_prefix<I>(&self, info: I) -> MemoryTable
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        self.filter(&Filter::prefix(info))
    }

    /// Rows whose dimension `column` equals `value`.
    pub fn filter_column(&self, column: usize, value: &str) -> MemoryTable {
        self.filter(&Filter::column_equals(column, value))
    }

    /// Rows accepted by `predicate`.
    pub fn filter_rows(&self, predicate: impl Fn(&Row) -> bool) -> MemoryTable {
        self.filter(&Filter::row(predicate))
    }

    /// Rows whose dimension `column` is accepted by `predicate`.
    pub fn filter_column_by(&self, column: usize, predicate: impl Fn(&str) -> bool) -> MemoryTable {
        self.filter(&Filter::column(column, predicate))
    }

    /// Distinct values of one dimension, in ascending order.
    pub fn distinct(&self, column: usize) -> Vec<String> {
        let values: BTreeSet<&str> = self.rows.iter().map(|r| r.column(column)).collect();
        values.into_iter().map(str::to_string).collect()
    }

    /// Distinct tuples over several dimensions, ordered case-insensitively.
    pub fn distinct_columns(&self, columns: &[usize]) -> Vec<Vec<String>> {
        let keys: BTreeSet<GroupKey> = self
            .rows
            .iter()
            .map(|r| GroupKey(r.columns(columns)))
            .collect();
        keys.into_iter().map(|k| k.0).collect()
    }

    /// Sum of values grouped by one dimension.
    pub fn sum_distinct(&self, column: usize) -> Vec<(String, f64)> {
        self.sum_distinct_columns(&[column])
            .into_iter()
            .map(|(mut key, sum)| (key.pop().unwrap_or_default(), sum))
            .collect()
    }

    /// Sum of values grouped by several dimensions, ordered like
    /// [`distinct_columns`](Self::distinct_columns).
    pub fn sum_distinct_columns(&self, columns: &[usize]) -> Vec<(Vec<String>, f64)> {
        let mut sums: BTreeMap<GroupKey, f64> = BTreeMap::new();
        for row in &self.rows {
            *sums.entry(GroupKey(row.columns(columns))).or_insert(0.0) += row.value();
        }
        sums.into_iter().map(|(k, v)| (k.0, v)).collect()
    }

    /// Sum of all values.
    pub fn sum(&self) -> f64 {
        self.rows.iter().map(Row::value).sum()
    }

    /// One dimension of every row, in row order.
    pub fn column(&self, column: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.column(column).to_string())
            .collect()
    }

    /// Projection of every row; an empty list returns whole tuples.
    pub fn columns(&self, columns: &[usize]) -> Vec<Vec<String>> {
        self.rows.iter().map(|r| r.columns(columns)).collect()
    }
}

impl FromIterator<Row> for MemoryTable {
    fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
        MemoryTable::from_rows(iter)
    }
}
