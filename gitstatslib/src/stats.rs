//! High-level collection API.
//!
//! Entry points that turn a repository (or a saved snapshot) into the line
//! statistics table:
//! 1. Discover the repository and resolve HEAD
//! 2. Select the tracked files with a known language
//! 3. Reuse the cached snapshot for this HEAD, or run the pipeline
//! 4. Drop ignored revisions and rename authors

use std::path::{Path, PathBuf};

use gix::ObjectId;
use log::info;

use crate::blame::GitBlame;
use crate::columns::FILE;
use crate::filter::FilterConfig;
use crate::options::StatsOptions;
use crate::pipeline::Pipeline;
use crate::postprocess::{drop_ignored, remap_authors};
use crate::progress::Progress;
use crate::repository::Repository;
use crate::table::{snapshot, DiskTable, MemoryTable};
use crate::Result;

/// Collect line statistics for the repository containing `path`.
///
/// # Example
///
/// ```rust,ignore
/// use gitstatslib::{collect_repository, StatsOptions};
///
/// let table = collect_repository(".", &StatsOptions::new().threads(4))?;
/// println!("{} lines", table.sum());
/// ```
pub fn collect_repository(path: impl AsRef<Path>, options: &StatsOptions) -> Result<MemoryTable> {
    collect_repository_with_progress(path, options, Progress::new)
}

/// Like [`collect_repository`], with a caller-built [`Progress`] over the
/// number of selected files.
pub fn collect_repository_with_progress(
    path: impl AsRef<Path>,
    options: &StatsOptions,
    progress: impl FnOnce(usize) -> Progress,
) -> Result<MemoryTable> {
    let repo = Repository::discover(path)?;
    let languages = options.language_table();

    let mut cache = options
        .cache_dir
        .as_ref()
        .map(|dir| DiskTable::new(cache_file(dir, repo.head(), &options.languages)));

    let cached = match cache.as_mut() {
        Some(cache) => {
            if cache.is_empty()? {
                None
            } else {
                info!("using cached statistics from {}", cache.path().display());
                Some(cache.table()?.clone())
            }
        }
        None => None,
    };

    let table = match cached {
        Some(table) => table,
        None => {
            // A cached table must hold every known file, whatever the filter
            let files = if cache.is_some() {
                FilterConfig::new().select(repo.files()?, &languages)
            } else {
                options.file_filter.select(repo.files()?, &languages)
            };
            let blame = GitBlame::new(repo.work_dir(), repo.head().to_string());
            let progress = progress(files.len());

            let table = Pipeline::new(&blame, &languages)
                .threads(options.threads)
                .run(&files, &progress)?;

            if let Some(cache) = cache.as_mut() {
                cache.inc_table(&table)?;
            }
            table
        }
    };

    if let Some(cache) = cache {
        cache.flush()?;
    }

    let table = table.filter_column_by(FILE, |file| options.file_filter.matches(file));
    let ignored = repo.resolve_all(options.ignored_revisions.iter().map(String::as_str));
    let table = drop_ignored(&table, &ignored);
    remap_authors(&table, &options.author_mappings)
}

/// Cache file for a HEAD commit. Extra language mappings change which files
/// are counted and how, so they are part of the name.
fn cache_file(dir: &Path, head: ObjectId, languages: &[(String, String)]) -> PathBuf {
    let mut name = head.to_string();
    for (extension, language) in languages {
        name.push('-');
        name.extend(
            format!("{}={}", extension, language)
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '=' { c } else { '_' }),
        );
    }
    dir.join(format!("{}.csv", name))
}

/// Load a snapshot saved with `--output file.csv`.
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<MemoryTable> {
    let table = snapshot::load_csv(path.as_ref())?;
    info!("loaded {} rows from {}", table.len(), path.as_ref().display());
    Ok(table)
}

/// True if `path` names a CSV snapshot rather than a repository.
pub fn is_snapshot(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Collect every input and merge the results.
///
/// Each path is either a repository or a CSV snapshot. Author mappings also
/// apply to snapshots; ignored revisions only apply to repositories, where
/// they can be resolved.
pub fn collect_all<P: AsRef<Path>>(
    paths: &[P],
    options: &StatsOptions,
    progress: impl Fn(usize) -> Progress,
) -> Result<MemoryTable> {
    let mut merged = MemoryTable::new();
    for path in paths {
        let path = path.as_ref();
        let table = if is_snapshot(path) {
            remap_authors(&load_snapshot(path)?, &options.author_mappings)?
        } else {
            collect_repository_with_progress(path, options, &progress)?
        };
        merged.inc_table(&table)?;
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{AUTHOR, LANGUAGE, LINE_TYPE};
    use crate::table::snapshot::{save_csv, SaveMode};
    use std::fs;
    use std::process::Command;
    use tempfile::{tempdir, TempDir};

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_DATE", "2024-01-15T12:00:00Z")
            .env("GIT_COMMITTER_DATE", "2024-01-15T12:00:00Z")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// A repository with one commit by "jd", or `None` when git is unavailable.
    fn init_repo() -> Option<TempDir> {
        let temp = tempdir().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::create_dir_all(dir.join("vendor")).unwrap();
        fs::write(
            dir.join("src/lib.rs"),
            "// Library\n\npub fn answer() -> u32 {\n    42\n}\n",
        )
        .unwrap();
        fs::write(dir.join("vendor/dep.c"), "int x;\n").unwrap();
        fs::write(dir.join("README"), "not counted\n").unwrap();

        let ok = git(dir, &["init", "-q"])
            && git(dir, &["config", "user.name", "jd"])
            && git(dir, &["config", "user.email", "jd@example.com"])
            && git(dir, &["config", "commit.gpgsign", "false"])
            && git(dir, &["add", "."])
            && git(dir, &["commit", "-q", "-m", "initial"]);
        ok.then_some(temp)
    }

    #[test]
    fn test_collect_repository() {
        let Some(repo) = init_repo() else {
            return;
        };
        let options = StatsOptions::new().threads(2).author("jd", "Jane Doe");
        let table = collect_repository(repo.path(), &options).unwrap();

        assert_eq!(table.sum(), 6.0);
        assert_eq!(
            table.sum_distinct(LANGUAGE),
            vec![("C".to_string(), 1.0), ("Rust".to_string(), 5.0)]
        );
        assert_eq!(table.distinct(AUTHOR), vec!["Jane Doe"]);
        assert_eq!(
            table.filter_prefix(["Rust"]).sum_distinct(LINE_TYPE),
            vec![
                ("Code".to_string(), 3.0),
                ("Comment".to_string(), 1.0),
                ("Empty".to_string(), 1.0)
            ]
        );
    }

    #[test]
    fn test_exclude_and_ignore() {
        let Some(repo) = init_repo() else {
            return;
        };
        let options = StatsOptions::new().threads(1).exclude("vendor").unwrap();
        let table = collect_repository(repo.path(), &options).unwrap();
        assert_eq!(table.sum(), 5.0);

        let options = options.ignore_revision("HEAD").ignore_revision("does-not-exist");
        let table = collect_repository(repo.path(), &options).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_cache_is_reused() {
        let Some(repo) = init_repo() else {
            return;
        };
        let cache_dir = tempdir().unwrap();
        let options = StatsOptions::new().threads(1).cache_dir(cache_dir.path());

        let first = collect_repository(repo.path(), &options).unwrap();
        let entries: Vec<_> = fs::read_dir(cache_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);

        // Remove a file from the work tree: HEAD is unchanged, so the
        // cached result must still be used.
        fs::remove_file(repo.path().join("src/lib.rs")).unwrap();
        let second = collect_repository(repo.path(), &options).unwrap();
        assert_eq!(second.sum(), first.sum());
        assert_eq!(second.sum_distinct(LANGUAGE), first.sum_distinct(LANGUAGE));
    }

    #[test]
    fn test_cache_holds_files_outside_the_filter() {
        let Some(repo) = init_repo() else {
            return;
        };
        let cache_dir = tempdir().unwrap();
        let cached = StatsOptions::new().threads(1).cache_dir(cache_dir.path());

        let excluded = cached.clone().exclude("vendor").unwrap();
        let excluded = collect_repository(repo.path(), &excluded).unwrap();
        assert_eq!(excluded.sum(), 5.0);

        // Same HEAD and cache, wider filter: vendor/dep.c must come back.
        let unfiltered = collect_repository(repo.path(), &cached).unwrap();
        assert_eq!(unfiltered.sum(), 6.0);
        assert_eq!(unfiltered.distinct(FILE), vec!["src/lib.rs", "vendor/dep.c"]);

        let included = collect_repository(
            repo.path(),
            &cached.clone().filter(FilterConfig::new().include("vendor/**").unwrap()),
        )
        .unwrap();
        assert_eq!(included.sum(), 1.0);
    }

    #[test]
    fn test_cache_depends_on_language_mappings() {
        let Some(repo) = init_repo() else {
            return;
        };
        let cache_dir = tempdir().unwrap();
        let options = StatsOptions::new().threads(1).cache_dir(cache_dir.path());

        let plain = collect_repository(repo.path(), &options).unwrap();
        assert_eq!(plain.distinct(LANGUAGE), vec!["C", "Rust"]);

        let remapped = options.clone().language("c", "Rust");
        let remapped = collect_repository(repo.path(), &remapped).unwrap();
        assert_eq!(remapped.distinct(LANGUAGE), vec!["Rust"]);
        assert_eq!(remapped.sum(), 6.0);

        let entries: Vec<_> = fs::read_dir(cache_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_cache_file_name() {
        let head = ObjectId::null(gix::hash::Kind::Sha1);
        let dir = Path::new("/cache");
        assert_eq!(cache_file(dir, head, &[]), dir.join(format!("{}.csv", head)));
        assert_eq!(
            cache_file(dir, head, &[("inc".to_string(), "Objective C".to_string())]),
            dir.join(format!("{}-inc=Objective_C.csv", head))
        );
    }

    #[test]
    fn test_collect_all_with_snapshots() {
        let temp = tempdir().unwrap();
        let mut table = MemoryTable::new();
        table
            .inc(2.0, ["Rust", "Code", "2024-01", "abc", "jd", "a.rs"])
            .unwrap();
        let first = temp.path().join("first.csv");
        let second = temp.path().join("second.CSV");
        save_csv(&table, &first, SaveMode::Truncate).unwrap();
        save_csv(&table, &second, SaveMode::Truncate).unwrap();

        let options = StatsOptions::new().author("jd", "Jane Doe");
        let merged = collect_all(&[&first, &second], &options, Progress::new).unwrap();

        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged
                .get(["Rust", "Code", "2024-01", "abc", "Jane Doe", "a.rs"])
                .unwrap(),
            4.0
        );
    }

    #[test]
    fn test_is_snapshot() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("x.csv");
        fs::write(&file, "").unwrap();
        assert!(is_snapshot(&file));
        assert!(!is_snapshot(temp.path()));
        assert!(!is_snapshot(&temp.path().join("missing.csv")));
    }
}
