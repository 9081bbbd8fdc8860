//! File selection with glob pattern support.
//!
//! Decides which repository files enter the pipeline: a file must have a
//! known language, match an include pattern (if any), and not be excluded.

use glob::Pattern;

use crate::error::GitStatsError;
use crate::languages::LanguageTable;
use crate::Result;

/// Configuration for file filtering.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Glob patterns to include (if empty, include every known file)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
    /// Directories whose content is excluded
    pub exclude_dirs: Vec<String>,
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| GitStatsError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclusion. Glob patterns are matched against the whole path;
    /// anything else is a directory (or file) whose content is skipped.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        if is_glob(pattern) {
            self.exclude.push(compile(pattern)?);
        } else {
            let dir = pattern.trim_start_matches("./").trim_end_matches('/');
            if !dir.is_empty() {
                self.exclude_dirs.push(dir.to_string());
            }
        }
        Ok(self)
    }

    /// Add multiple exclusions.
    pub fn exclude_many<'a>(mut self, patterns: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Check a repository-relative path against the patterns only.
    pub fn matches(&self, path: &str) -> bool {
        let in_excluded_dir = self.exclude_dirs.iter().any(|dir| {
            path == dir
                || path
                    .strip_prefix(dir.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        });
        if in_excluded_dir || self.exclude.iter().any(|p| p.matches(path)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(path))
    }

    /// Keep the files that match and have a known language.
    pub fn select(&self, files: Vec<String>, languages: &LanguageTable) -> Vec<String> {
        files
            .into_iter()
            .filter(|f| languages.is_known_type(f) && self.matches(f))
            .collect()
    }
}
