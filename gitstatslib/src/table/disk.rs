//! Disk-backed table: a [`MemoryTable`] that loads a CSV snapshot on first
//! read and writes itself back once, when flushed.

use std::path::{Path, PathBuf};

use log::debug;

use super::snapshot::{self, SaveMode};
use super::{Filter, KeyPart, MemoryTable};
use crate::Result;

/// A table cached in a CSV file.
///
/// The snapshot is read at most once per instance. Later changes to the
/// file are not observed. Writes stay in memory until [`DiskTable::flush`],
/// which consumes the table.
#[derive(Debug)]
pub struct DiskTable {
    path: PathBuf,
    data: MemoryTable,
    loaded: bool,
    dirty: bool,
}

impl DiskTable {
    /// Wrap `path`. Nothing is read until the first query.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: MemoryTable::new(),
            loaded: false,
            dirty: false,
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the snapshot has been read (or found missing).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True if there are writes not yet flushed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn ensure_loaded(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        self.loaded = true;
        if self.path.exists() {
            debug!("loading snapshot {}", self.path.display());
            snapshot::load_csv_into(&self.path, &mut self.data)?;
        }
        Ok(())
    }

    /// Append a row. Does not read the snapshot.
    pub fn add<I>(&mut self, value: f64, info: I)
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        self.data.add(value, info);
        self.dirty = true;
    }

    /// Increment a row, reading the snapshot first so existing rows match.
    pub fn inc<I>(&mut self, value: f64, info: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        self.ensure_loaded()?;
        self.data.inc(value, info)?;
        self.dirty = true;
        Ok(())
    }

    /// Append all rows of `other`.
    pub fn add_table(&mut self, other: &MemoryTable) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        self.ensure_loaded()?;
        self.data.add_table(other);
        self.dirty = true;
        Ok(())
    }

    /// Increment by all rows of `other`.
    pub fn inc_table(&mut self, other: &MemoryTable) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        self.ensure_loaded()?;
        self.data.inc_table(other)?;
        self.dirty = true;
        Ok(())
    }

    /// The loaded content.
    pub fn table(&mut self) -> Result<&MemoryTable> {
        self.ensure_loaded()?;
        Ok(&self.data)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.table()?.is_empty())
    }

    pub fn len(&mut self) -> Result<usize> {
        Ok(self.table()?.len())
    }

    pub fn get<I>(&mut self, info: I) -> Result<f64>
    where
        I: IntoIterator,
        I::Item: KeyPart,
    {
        self.table()?.get(info)
    }

    pub fn filter(&mut self, filter: &Filter<'_>) -> Result<MemoryTable> {
        Ok(self.table()?.filter(filter))
    }

    pub fn distinct(&mut self, column: usize) -> Result<Vec<String>> {
        Ok(self.table()?.distinct(column))
    }

    pub fn sum_distinct(&mut self, column: usize) -> Result<Vec<(String, f64)>> {
        Ok(self.table()?.sum_distinct(column))
    }

    pub fn sum(&mut self) -> Result<f64> {
        Ok(self.table()?.sum())
    }

    /// Write pending changes and return the content.
    ///
    /// If the snapshot was never read, the in-memory rows are new and are
    /// appended to whatever the file holds. If it was read, the file is
    /// rewritten with the full content.
    pub fn flush(self) -> Result<MemoryTable> {
        if !self.dirty {
            return Ok(self.data);
        }
        let mode = if self.loaded {
            SaveMode::Truncate
        } else {
            SaveMode::Append
        };
        debug!(
            "writing {} rows to {} ({:?})",
            self.data.len(),
            self.path.display(),
            mode
        );
        snapshot::save_csv(&self.data, &self.path, mode)?;
        Ok(self.data)
    }
}
