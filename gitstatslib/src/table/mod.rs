//! Multi-key aggregation tables.
//!
//! A table is a bag of rows, each row being a numeric value plus an ordered
//! tuple of string dimensions. Dimension positions have a fixed, table-wide
//! meaning (see [`crate::columns`]).
//!
//! - [`MemoryTable`]: the in-memory store (increment, filter, group-by)
//! - [`DiskTable`]: a decorator that lazily loads a CSV snapshot and persists
//!   the table once, at shutdown
//! - [`Filter`]: the row selections supported by `filter`
//!
//! ## Example
//!
//! ```rust
//! use gitstatslib::table::MemoryTable;
//!
//! let mut table = MemoryTable::new();
//! table.inc(1.0, ["Rust", "Code"]).unwrap();
//! table.inc(1.0, ["Rust", "Code"]).unwrap();
//! table.inc(1.0, ["Rust", "Comment"]).unwrap();
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get(["Rust", "Code"]).unwrap(), 2.0);
//! assert_eq!(table.filter_prefix(["Rust"]).sum(), 3.0);
//! ```

pub mod disk;
pub mod filter;
pub mod memory;
pub mod snapshot;

use std::cmp::Ordering;

use serde::Serialize;

pub use disk::DiskTable;
pub use filter::Filter;
pub use memory::MemoryTable;

/// One value of a row key.
///
/// Implemented for the string types callers usually hold, and for `Option`
/// of those: an absent value becomes `""`.
pub trait KeyPart {
    /// Convert into an owned dimension value.
    fn into_part(self) -> String;
}

impl KeyPart for String {
    fn into_part(self) -> String {
        self
    }
}

impl KeyPart for &String {
    fn into_part(self) -> String {
        self.clone()
    }
}

impl KeyPart for &str {
    fn into_part(self) -> String {
        self.to_string()
    }
}

impl KeyPart for &&str {
    fn into_part(self) -> String {
        (*self).to_string()
    }
}

impl<T: KeyPart> KeyPart for Option<T> {
    fn into_part(self) -> String {
        self.map(KeyPart::into_part).unwrap_or_default()
    }
}

/// Build the canonical form of a key: absent values become `""` and
/// trailing empty values are dropped.
pub fn canonical_key<I>(info: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: KeyPart,
{
    let mut key: Vec<String> = info.into_iter().map(KeyPart::into_part).collect();
    let len = key.iter().rposition(|v| !v.is_empty()).map_or(0, |last| last + 1);
    key.truncate(len);
    key
}

/// A single table row: a value and its dimension tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    value: f64,
    info: Vec<String>,
}

impl Row {
    /// Create a row, canonicalizing its key.
    pub fn new<I>(value: f64, info: I) -> Self
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        Self {
            value,
            info: canonical_key(info),
        }
    }

    pub(crate) fn from_canonical(value: f64, info: Vec<String>) -> Self {
        Self { value, info }
    }

    /// The row value.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub(crate) fn add_value(&mut self, value: f64) {
        self.value += value;
    }

    /// The canonical dimension tuple (no trailing empty values).
    pub fn info(&self) -> &[String] {
        &self.info
    }

    /// Value of one dimension; positions past the tuple read as `""`.
    pub fn column(&self, column: usize) -> &str {
        self.info.get(column).map_or("", String::as_str)
    }

    /// Project the given dimensions. An empty list returns the whole tuple.
    pub fn columns(&self, columns: &[usize]) -> Vec<String> {
        if columns.is_empty() {
            return self.info.clone();
        }
        columns.iter().map(|&c| self.column(c).to_string()).collect()
    }

    /// True if the first `prefix.len()` dimensions equal `prefix`.
    pub fn starts_with(&self, prefix: &[String]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, expected)| self.column(i) == expected)
    }
}

/// Case-insensitive comparison, falling back to exact order on ties so that
/// values differing only in case stay distinct.
pub(crate) fn compare_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// Order used by grouped queries: left to right, first difference wins.
pub(crate) fn compare_keys(a: &[String], b: &[String]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match compare_ignore_case(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Key wrapper giving tuples the grouped-query order inside ordered maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GroupKey(pub Vec<String>);

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_keys(&self.0, &other.0)
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key_drops_trailing_empty() {
        assert_eq!(canonical_key(["X", "Code", "", ""]), vec!["X", "Code"]);
        assert_eq!(canonical_key(["X", "", "Code"]), vec!["X", "", "Code"]);
        assert_eq!(canonical_key(["", ""]), Vec::<String>::new());
    }

    #[test]
    fn test_canonical_key_absent_values() {
        let key = canonical_key([Some("a"), None, Some("b"), None]);
        assert_eq!(key, vec!["a", "", "b"]);
    }

    #[test]
    fn test_row_column_past_end_is_empty() {
        let row = Row::new(1.0, ["a"]);
        assert_eq!(row.column(0), "a");
        assert_eq!(row.column(5), "");
        assert_eq!(row.columns(&[0, 3]), vec!["a", ""]);
        assert_eq!(row.columns(&[]), vec!["a"]);
    }

    #[test]
    fn test_row_starts_with_pads_short_rows() {
        let row = Row::new(1.0, ["a"]);
        assert!(row.starts_with(&["a".to_string(), String::new()]));
        assert!(!row.starts_with(&["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_compare_keys_case_insensitive() {
        let a = vec!["apple".to_string(), "z".to_string()];
        let b = vec!["Banana".to_string(), "a".to_string()];
        assert_eq!(compare_keys(&a, &b), Ordering::Less);

        let upper = vec!["Bob".to_string()];
        let lower = vec!["bob".to_string()];
        assert_ne!(compare_keys(&upper, &lower), Ordering::Equal);
    }
}
