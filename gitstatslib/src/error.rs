//! Error types for gitstatslib

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while collecting or querying line statistics
#[derive(Error, Debug)]
pub enum GitStatsError {
    /// More than one row matches a key that must be unique
    #[error("more than one row ({matches}) has key {key:?}")]
    AmbiguousKey { key: Vec<String>, matches: usize },

    /// Point lookup found no row
    #[error("no row has key {key:?}")]
    NotFound { key: Vec<String> },

    /// Failed to read or write a snapshot file
    #[error("failed to access snapshot '{path}': {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Snapshot file exists but its content can't be parsed
    #[error("invalid snapshot '{path}' at record {record}: {message}")]
    InvalidSnapshot {
        path: PathBuf,
        record: u64,
        message: String,
    },

    /// The blame provider failed for a file
    #[error("failed to blame '{path}': {message}")]
    Blame { path: String, message: String },

    /// Git operation error
    #[error("git error: {0}")]
    Git(String),

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// A `key=value` option without `=`
    #[error("invalid mapping '{0}', expected the format key=value")]
    InvalidMapping(String),

    /// A pipeline worker panicked
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}
