//! Table rewrites applied after collection.
//!
//! Both operate on the table alone, so they give the same result on a
//! freshly computed table and on one loaded from the cache.

use std::collections::{HashMap, HashSet};

use gix::ObjectId;
use log::debug;

use crate::columns::{AUTHOR, REVISION};
use crate::error::GitStatsError;
use crate::table::MemoryTable;
use crate::Result;

/// Remove the lines last touched by one of `revisions`.
pub fn drop_ignored(table: &MemoryTable, revisions: &[ObjectId]) -> MemoryTable {
    if revisions.is_empty() {
        return table.clone();
    }
    let ignored: HashSet<String> = revisions.iter().map(ObjectId::to_string).collect();
    let kept = table.filter_column_by(REVISION, |rev| !ignored.contains(rev));
    debug!(
        "ignored revisions removed {} rows",
        table.len() - kept.len()
    );
    kept
}

/// Rename authors, merging rows that end up with the same key.
pub fn remap_authors(table: &MemoryTable, mappings: &HashMap<String, String>) -> Result<MemoryTable> {
    if mappings.is_empty() {
        return Ok(table.clone());
    }

    let mut remapped = MemoryTable::new();
    for row in table.rows() {
        let mut info = row.info().to_vec();
        if let Some(author) = info.get_mut(AUTHOR).filter(|a| !a.is_empty()) {
            if let Some(name) = mappings.get(author.as_str()) {
                *author = name.clone();
            }
        }
        remapped.inc(row.value(), info)?;
    }
    Ok(remapped)
}

/// Parse a `key=value` option, trimming both sides.
pub fn parse_mapping(text: &str) -> Result<(String, String)> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| GitStatsError::InvalidMapping(text.to_string()))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Parse a list of `key=value` options into a map. Later entries win.
pub fn parse_mappings<'a>(items: impl IntoIterator<Item = &'a str>) -> Result<HashMap<String, String>> {
    items.into_iter().map(parse_mapping).collect()
}
