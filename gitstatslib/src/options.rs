//! Input options for collecting line statistics.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::filter::FilterConfig;
use crate::languages::LanguageTable;
use crate::postprocess::parse_mapping;
use crate::Result;

/// Options for [`collect_repository`](crate::collect_repository).
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Number of workers (0 = one per CPU, minus one on larger machines)
    pub threads: usize,
    /// Revision specs whose lines are dropped from the result
    pub ignored_revisions: Vec<String>,
    /// Author renames (`login` -> `Full Name`)
    pub author_mappings: HashMap<String, String>,
    /// File filter configuration
    pub file_filter: FilterConfig,
    /// Extra extension -> language mappings
    pub languages: Vec<(String, String)>,
    /// Directory holding one snapshot per analysed HEAD. `None` disables the
    /// cache.
    pub cache_dir: Option<PathBuf>,
}

impl StatsOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of workers.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Ignore the lines last touched by a revision.
    pub fn ignore_revision(mut self, spec: impl Into<String>) -> Self {
        self.ignored_revisions.push(spec.into());
        self
    }

    /// Rename an author.
    pub fn author(mut self, login: impl Into<String>, name: impl Into<String>) -> Self {
        self.author_mappings.insert(login.into(), name.into());
        self
    }

    /// Rename an author from a `login=Full Name` option.
    pub fn author_mapping(self, mapping: &str) -> Result<Self> {
        let (login, name) = parse_mapping(mapping)?;
        Ok(self.author(login, name))
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.file_filter = filter;
        self
    }

    /// Exclude a path or glob pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.file_filter = self.file_filter.exclude(pattern)?;
        Ok(self)
    }

    /// Map a file extension to a language.
    pub fn language(mut self, extension: impl Into<String>, language: impl Into<String>) -> Self {
        self.languages.push((extension.into(), language.into()));
        self
    }

    /// Map a file extension to a language from an `ext=Language` option.
    pub fn language_mapping(self, mapping: &str) -> Result<Self> {
        let (extension, language) = parse_mapping(mapping)?;
        Ok(self.language(extension, language))
    }

    /// Cache results under `dir`.
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// The built-in language table extended with the configured mappings.
    pub fn language_table(&self) -> LanguageTable {
        self.languages
            .iter()
            .fold(LanguageTable::builtin(), |table, (ext, lang)| {
                table.with_extension(ext, lang)
            })
    }
}
