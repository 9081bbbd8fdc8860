//! Git repository access: HEAD resolution, tracked files and revision specs.

use std::path::{Path, PathBuf};

use gix::ObjectId;
use log::{debug, warn};

use crate::error::GitStatsError;
use crate::Result;

/// A repository opened at its HEAD commit.
pub struct Repository {
    repo: gix::Repository,
    work_dir: PathBuf,
    head: ObjectId,
}

impl Repository {
    /// Discover the repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = gix::discover(path).map_err(|e| {
            GitStatsError::Git(format!("{} is not a git repository: {}", path.display(), e))
        })?;

        let work_dir = repo
            .work_dir()
            .ok_or_else(|| GitStatsError::Git("Repository has no work directory".to_string()))?
            .to_path_buf();

        let head = repo
            .head_commit()
            .map_err(|e| GitStatsError::Git(format!("Failed to get HEAD commit: {}", e)))?
            .id;

        debug!("opened {} at {}", work_dir.display(), head);
        Ok(Self {
            repo,
            work_dir,
            head,
        })
    }

    /// Root of the work tree.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The HEAD commit id.
    pub fn head(&self) -> ObjectId {
        self.head
    }

    /// Repository-relative paths of every blob in the HEAD tree, sorted.
    pub fn files(&self) -> Result<Vec<String>> {
        let tree = self
            .repo
            .find_commit(self.head)
            .map_err(|e| GitStatsError::Git(format!("Failed to find HEAD commit: {}", e)))?
            .tree()
            .map_err(|e| GitStatsError::Git(format!("Failed to get HEAD tree: {}", e)))?;

        let mut files = Vec::new();
        collect_tree_entries(&self.repo, &tree, "", &mut files)?;
        files.sort();
        Ok(files)
    }

    /// Resolve a revision spec to a commit id.
    pub fn resolve(&self, spec: &str) -> Result<ObjectId> {
        let id = self
            .repo
            .rev_parse_single(spec.as_bytes())
            .map_err(|e| GitStatsError::Git(format!("Failed to resolve '{}': {}", spec, e)))?
            .detach();

        let commit = self
            .repo
            .find_commit(id)
            .map_err(|e| GitStatsError::Git(format!("Failed to find commit '{}': {}", spec, e)))?;
        Ok(commit.id)
    }

    /// Resolve every spec, skipping (with a warning) those that don't name a
    /// commit.
    pub fn resolve_all<'a>(&self, specs: impl IntoIterator<Item = &'a str>) -> Vec<ObjectId> {
        specs
            .into_iter()
            .filter_map(|spec| match self.resolve(spec) {
                Ok(id) => Some(id),
                Err(e) => {
                    warn!("Could not find revision {}: {}", spec, e);
                    None
                }
            })
            .collect()
    }
}

fn collect_tree_entries(
    repo: &gix::Repository,
    tree: &gix::Tree<'_>,
    prefix: &str,
    files: &mut Vec<String>,
) -> Result<()> {
    for entry in tree.iter() {
        let entry =
            entry.map_err(|e| GitStatsError::Git(format!("Failed to read tree entry: {}", e)))?;

        let path = if prefix.is_empty() {
            entry.filename().to_string()
        } else {
            format!("{}/{}", prefix, entry.filename())
        };

        if entry.mode().is_blob() {
            files.push(path);
        } else if entry.mode().is_tree() {
            let subtree = repo
                .find_object(entry.oid())
                .map_err(|e| GitStatsError::Git(format!("Failed to find tree: {}", e)))?
                .try_into_tree()
                .map_err(|_| GitStatsError::Git("Object is not a tree".to_string()))?;
            collect_tree_entries(repo, &subtree, &path, files)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// A repository with one commit, or `None` when git is unavailable.
    fn init_repo() -> Option<TempDir> {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        fs::create_dir_all(dir.join("src/nested")).unwrap();
        fs::write(dir.join("src/lib.rs"), "// lib\nfn a() {}\n").unwrap();
        fs::write(dir.join("src/nested/mod.rs"), "\n").unwrap();
        fs::write(dir.join("README"), "hello\n").unwrap();

        let ok = git(dir, &["init", "-q"])
            && git(dir, &["config", "user.name", "Test"])
            && git(dir, &["config", "user.email", "test@example.com"])
            && git(dir, &["add", "."])
            && git(dir, &["commit", "-q", "-m", "initial"]);
        ok.then_some(temp)
    }

    #[test]
    fn test_files_and_resolve() {
        let Some(temp) = init_repo() else {
            return;
        };
        let repo = Repository::discover(temp.path().join("src")).unwrap();

        assert_eq!(
            repo.files().unwrap(),
            vec!["README", "src/lib.rs", "src/nested/mod.rs"]
        );
        assert_eq!(repo.resolve("HEAD").unwrap(), repo.head());
        assert_eq!(repo.resolve_all(["HEAD", "no-such-rev"]), vec![repo.head()]);
    }

    #[test]
    fn test_not_a_repository() {
        let temp = tempfile::tempdir().unwrap();
        let err = Repository::discover(temp.path()).err().unwrap();
        assert!(matches!(err, GitStatsError::Git(_)));
    }
}
