//! # gitstatslib
//!
//! Line provenance statistics for git repositories: who last touched each
//! line, when, in which language, and whether it is code, comment or blank.
//!
//! ## Overview
//!
//! Every tracked file with a known language is blamed at HEAD. Each line
//! becomes one increment in a multi-key table whose dimensions are
//! `[language, line type, month, revision, author, file]` (see [`columns`]).
//! Reports are plain queries over that table: filter, group-by and
//! distinct.
//!
//! - **Table**: [`MemoryTable`] aggregates rows by key; [`DiskTable`] caches
//!   a table in a CSV snapshot
//! - **Classifier**: a per-language state machine tagging lines as code,
//!   comment or empty
//! - **Pipeline**: a worker pool that blames files in parallel, each worker
//!   filling a private table, merged at the end
//!
//! ## Example
//!
//! ```rust
//! use gitstatslib::columns::{AUTHOR, LINE_TYPE};
//! use gitstatslib::{MemoryTable, Report, Ordering};
//!
//! let mut table = MemoryTable::new();
//! table.inc(3.0, ["Rust", "Code", "2024-01", "4f2a", "Jane", "src/lib.rs"]).unwrap();
//! table.inc(1.0, ["Rust", "Comment", "2024-01", "4f2a", "Jane", "src/lib.rs"]).unwrap();
//! table.inc(2.0, ["Rust", "Code", "2024-02", "9c1e", "John", "src/main.rs"]).unwrap();
//!
//! assert_eq!(table.filter_column(LINE_TYPE, "Code").sum(), 5.0);
//!
//! let report = Report::by(&table, AUTHOR, Ordering::Total);
//! assert_eq!(report.items[0].label, "Jane");
//! assert_eq!(report.items[0].total, 4.0);
//! ```

pub mod blame;
pub mod classifier;
pub mod columns;
pub mod error;
pub mod filter;
pub mod languages;
pub mod options;
pub mod pipeline;
pub mod postprocess;
pub mod progress;
pub mod report;
pub mod repository;
pub mod stats;
pub mod table;

pub use blame::{BlameLine, BlameProvider, GitBlame};
pub use classifier::{CommentSyntax, LineClassifier, LineType};
pub use error::GitStatsError;
pub use filter::FilterConfig;
pub use languages::LanguageTable;
pub use options::StatsOptions;
pub use pipeline::Pipeline;
pub use progress::Progress;
pub use report::{sparkline, LineCounts, Ordering, Report, ReportItem, Summary};
pub use repository::Repository;
pub use stats::{collect_all, collect_repository, collect_repository_with_progress, load_snapshot};
pub use table::{DiskTable, Filter, MemoryTable, Row};

/// Result type for gitstatslib operations
pub type Result<T> = std::result::Result<T, GitStatsError>;
