//! Dimension positions of the line statistics table.
//!
//! Every row produced by the pipeline has the key
//! `[language, line type, month, revision, author, file]`.

/// Language name, as detected from the file name
pub const LANGUAGE: usize = 0;
/// `Empty`, `Comment` or `Code`
pub const LINE_TYPE: usize = 1;
/// `YYYY-MM` of the committer time, in UTC
pub const MONTH: usize = 2;
/// Hex id of the commit that last touched the line
pub const REVISION: usize = 3;
/// Author name, after mapping
pub const AUTHOR: usize = 4;
/// Repository-relative path
pub const FILE: usize = 5;

/// Number of dimensions in a full key.
pub const COUNT: usize = 6;

/// Column name used on the command line and in reports.
pub fn name(column: usize) -> &'static str {
    match column {
        LANGUAGE => "language",
        LINE_TYPE => "type",
        MONTH => "month",
        REVISION => "revision",
        AUTHOR => "author",
        FILE => "file",
        _ => "",
    }
}

/// Parse a column name.
pub fn from_name(name: &str) -> Option<usize> {
    match name.to_ascii_lowercase().as_str() {
        "language" | "lang" => Some(LANGUAGE),
        "type" => Some(LINE_TYPE),
        "month" => Some(MONTH),
        "revision" | "rev" => Some(REVISION),
        "author" => Some(AUTHOR),
        "file" => Some(FILE),
        _ => None,
    }
}
