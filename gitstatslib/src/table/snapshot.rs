//! CSV snapshots of a table.
//!
//! One record per row, no header: field 0 is the value, the remaining fields
//! are the dimension tuple in positional order. Loading adds rows through
//! the table's own insert path, so keys are canonicalized there.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use super::MemoryTable;
use crate::error::GitStatsError;
use crate::Result;

/// How [`save_csv`] treats an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Replace the file content
    Truncate,
    /// Add records after the existing ones
    Append,
}

/// Write a table to `path`, creating parent directories as needed.
pub fn save_csv(table: &MemoryTable, path: impl AsRef<Path>, mode: SaveMode) -> Result<()> {
    let path = path.as_ref();
    let persistence = |source| GitStatsError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persistence)?;
    }

    let file = match mode {
        SaveMode::Truncate => File::create(path),
        SaveMode::Append => OpenOptions::new().create(true).append(true).open(path),
    }
    .map_err(persistence)?;

    write_csv(table, file).map_err(|e| csv_error(path, 0, e))
}

/// Write a table as CSV records to any writer.
pub fn write_csv<W: Write>(table: &MemoryTable, writer: W) -> csv::Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    for row in table.rows() {
        let value = row.value().to_string();
        let fields = std::iter::once(value.as_str()).chain(row.info().iter().map(String::as_str));
        csv.write_record(fields)?;
    }

    csv.flush()?;
    Ok(())
}

/// Load a snapshot file into a new table.
pub fn load_csv(path: impl AsRef<Path>) -> Result<MemoryTable> {
    let mut table = MemoryTable::new();
    load_csv_into(path, &mut table)?;
    Ok(table)
}

/// Load a snapshot file, `add`ing every record to `table`.
pub fn load_csv_into(path: impl AsRef<Path>, table: &mut MemoryTable) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| GitStatsError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(path, file, table)
}

fn read_csv<R: Read>(path: &Path, reader: R, table: &mut MemoryTable) -> Result<()> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    for (i, record) in csv.records().enumerate() {
        let number = i as u64 + 1;
        let record = record.map_err(|e| csv_error(path, number, e))?;

        let raw = record.get(0).unwrap_or_default();
        let value: f64 = raw.trim().parse().map_err(|_| GitStatsError::InvalidSnapshot {
            path: path.to_path_buf(),
            record: number,
            message: format!("invalid value '{}'", raw),
        })?;
        if !value.is_finite() {
            return Err(GitStatsError::InvalidSnapshot {
                path: path.to_path_buf(),
                record: number,
                message: format!("value '{}' is not finite", raw),
            });
        }

        table.add(value, record.iter().skip(1));
    }

    Ok(())
}

fn csv_error(path: &Path, record: u64, err: csv::Error) -> GitStatsError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => GitStatsError::Persistence {
            path: path.to_path_buf(),
            source,
        },
        _ => GitStatsError::InvalidSnapshot {
            path: path.to_path_buf(),
            record,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> MemoryTable {
        let mut table = MemoryTable::new();
        table.inc(3.0, ["Rust", "Code", "2024-01", "abc", "Jane, \"JD\" Doe"]).unwrap();
        table.inc(1.5, ["Rust", "Empty"]).unwrap();
        table.inc(2.0, ["C", "Code", "", "", "", "src/a.c"]).unwrap();
        table.inc(4.0, ["Text\nwith newline"]).unwrap();
        table
    }

    #[test]
    fn test_write_format() {
        let mut table = MemoryTable::new();
        table.add(2.0, ["Rust", "Code"]);
        table.add(0.5, ["a,b"]);

        let mut out = Vec::new();
        write_csv(&table, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2,Rust,Code\n0.5,\"a,b\"\n");
    }

    #[test]
    fn test_round_trip_preserves_sums() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested/dir/stats.csv");
        let table = sample();

        save_csv(&table, &path, SaveMode::Truncate).unwrap();
        let loaded = load_csv(&path).unwrap();

        assert_eq!(loaded.sum(), table.sum());
        for column in 0..6 {
            assert_eq!(loaded.sum_distinct(column), table.sum_distinct(column));
        }
        assert_eq!(loaded.get(["C", "Code", "", "", "", "src/a.c"]).unwrap(), 2.0);
    }

    #[test]
    fn test_append_mode() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("stats.csv");

        save_csv(&sample(), &path, SaveMode::Truncate).unwrap();
        save_csv(&sample(), &path, SaveMode::Append).unwrap();
        assert_eq!(load_csv(&path).unwrap().len(), 8);

        save_csv(&sample(), &path, SaveMode::Truncate).unwrap();
        assert_eq!(load_csv(&path).unwrap().len(), 4);
    }

    #[test]
    fn test_loaded_rows_are_canonicalized() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("stats.csv");
        fs::write(&path, "1.0,X,Code,,\n2,X,Code\n").unwrap();

        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.columns(&[]), vec![vec!["X", "Code"], vec!["X", "Code"]]);
    }

    #[test]
    fn test_invalid_value() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("stats.csv");
        fs::write(&path, "1,a\nnope,b\n").unwrap();

        let err = load_csv(&path).unwrap_err();
        assert!(matches!(err, GitStatsError::InvalidSnapshot { record: 2, .. }));
    }

    #[test]
    fn test_missing_file() {
        let temp = tempdir().unwrap();
        let err = load_csv(temp.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, GitStatsError::Persistence { .. }));
    }
}
