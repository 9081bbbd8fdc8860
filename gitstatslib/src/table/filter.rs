//! Row selections accepted by [`MemoryTable::filter`](super::MemoryTable::filter).

use std::fmt;

use super::{KeyPart, Row};

/// Row selection used by `filter`.
///
/// All variants are evaluated by [`Filter::matches`]; none of them mutate
/// the table they are applied to.
pub enum Filter<'a> {
    /// Rows whose first dimensions equal the given tuple. Rows shorter than
    /// the tuple are compared as if padded with `""`.
    Prefix(Vec<String>),
    /// Rows whose dimension `column` equals `value`.
    ColumnEquals { column: usize, value: String },
    /// Rows accepted by an arbitrary predicate.
    Row(Box<dyn Fn(&Row) -> bool + 'a>),
    /// Rows whose dimension `column` is accepted by a predicate.
    Column {
        column: usize,
        predicate: Box<dyn Fn(&str) -> bool + 'a>,
    },
}

impl<'a> Filter<'a> {
    /// Prefix selection. Absent values are read as `""`.
    pub fn prefix<I>(info: I) -> Self
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        Filter::Prefix(info.into_iter().map(KeyPart::into_part).collect())
    }

    /// Single-dimension equality.
    pub fn column_equals(column: usize, value: impl Into<String>) -> Self {
        Filter::ColumnEquals {
            column,
            value: value.into(),
        }
    }

    /// Whole-row predicate.
    pub fn row(predicate: impl Fn(&Row) -> bool + 'a) -> Self {
        Filter::Row(Box::new(predicate))
    }

    /// Single-dimension predicate.
    pub fn column(column: usize, predicate: impl Fn(&str) -> bool + 'a) -> Self {
        Filter::Column {
            column,
            predicate: Box::new(predicate),
        }
    }

    /// Check whether a row is selected.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::Prefix(prefix) => row.starts_with(prefix),
            Filter::ColumnEquals { column, value } => row.column(*column) == value,
            Filter::Row(predicate) => predicate(row),
            Filter::Column { column, predicate } => predicate(row.column(*column)),
        }
    }
}

impl fmt::Debug for Filter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Filter::ColumnEquals { column, value } => f
                .debug_struct("ColumnEquals")
                .field("column", column)
                .field("value", value)
                .finish(),
            Filter::Row(_) => f.write_str("Row(<predicate>)"),
            Filter::Column { column, .. } => f
                .debug_struct("Column")
                .field("column", column)
                .finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_keeps_trailing_empty() {
        let filter = Filter::prefix(["a", ""]);
        assert!(filter.matches(&Row::new(1.0, ["a"])));
        assert!(!filter.matches(&Row::new(1.0, ["a", "b"])));
    }

    #[test]
    fn test_column_equals_past_end() {
        let filter = Filter::column_equals(3, "");
        assert!(filter.matches(&Row::new(1.0, ["a"])));
        assert!(!Filter::column_equals(0, "b").matches(&Row::new(1.0, ["a"])));
    }

    #[test]
    fn test_predicates() {
        let row = Row::new(4.0, ["a", "bc"]);
        assert!(Filter::row(|r| r.value() > 3.0).matches(&row));
        assert!(Filter::column(1, |v| v.len() == 2).matches(&row));
        assert!(!Filter::column(0, |v| v.is_empty()).matches(&row));
    }

    #[test]
    fn test_debug_output() {
        let filter = Filter::column(2, |_| true);
        assert_eq!(format!("{:?}", filter), "Column { column: 2, .. }");
    }
}
