//! Line attribution.
//!
//! A [`BlameProvider`] tells, for each line of a file at the analysed
//! revision, which commit last touched it, who authored that commit and
//! when it was committed. [`GitBlame`] asks the `git` executable.

use std::path::PathBuf;
use std::process::Command;

use gix::ObjectId;

use crate::error::GitStatsError;
use crate::Result;

/// Attribution of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameLine {
    /// Line content, without the line terminator
    pub text: String,
    /// Commit that last touched the line. `None` for lines git could not
    /// attribute.
    pub revision: Option<ObjectId>,
    /// Author name of that commit
    pub author: String,
    /// Committer time, seconds since the epoch
    pub time: i64,
}

impl BlameLine {
    /// A line with no attribution.
    pub fn unattributed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            revision: None,
            author: String::new(),
            time: 0,
        }
    }
}

/// Source of line attributions. Shared by all pipeline workers.
pub trait BlameProvider: Sync {
    /// Attribute every line of `path`, in file order.
    fn blame(&self, path: &str) -> Result<Vec<BlameLine>>;
}

/// Blame through `git blame --line-porcelain`.
#[derive(Debug, Clone)]
pub struct GitBlame {
    work_dir: PathBuf,
    revision: String,
}

impl GitBlame {
    /// Blame files of the work tree at `work_dir` as of `revision`.
    pub fn new(work_dir: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            work_dir: work_dir.into(),
            revision: revision.into(),
        }
    }
}

impl BlameProvider for GitBlame {
    fn blame(&self, path: &str) -> Result<Vec<BlameLine>> {
        let blame_error = |message: String| GitStatsError::Blame {
            path: path.to_string(),
            message,
        };

        let output = Command::new("git")
            .args(["blame", "--line-porcelain", "-w"])
            .arg(&self.revision)
            .args(["--", path])
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| blame_error(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(blame_error(stderr.trim().to_string()));
        }

        parse_porcelain(&String::from_utf8_lossy(&output.stdout)).map_err(blame_error)
    }
}

/// Parse `git blame --line-porcelain` output.
///
/// Every line is a header block (`<sha> <orig> <final> [<count>]`, then
/// `key value` fields) followed by the content prefixed with a tab.
pub fn parse_porcelain(output: &str) -> std::result::Result<Vec<BlameLine>, String> {
    let mut lines = Vec::new();
    let mut current: Option<BlameLine> = None;

    for raw in output.lines() {
        if let Some(text) = raw.strip_prefix('\t') {
            let mut line = current
                .take()
                .ok_or_else(|| "content line without a header".to_string())?;
            line.text = text.to_string();
            lines.push(line);
            continue;
        }

        match current.as_mut() {
            None => current = Some(parse_header(raw)?),
            Some(line) => {
                let (key, value) = raw.split_once(' ').unwrap_or((raw, ""));
                match key {
                    "author" => line.author = value.to_string(),
                    "committer-time" => {
                        line.time = value
                            .parse()
                            .map_err(|_| format!("invalid committer-time '{}'", value))?;
                    }
                    _ => {}
                }
            }
        }
    }

    if current.is_some() {
        return Err("truncated output: header without content".to_string());
    }

    for line in lines.iter_mut().filter(|l| l.revision.is_none()) {
        line.author.clear();
        line.time = 0;
    }

    Ok(lines)
}

fn parse_header(raw: &str) -> std::result::Result<BlameLine, String> {
    let sha = raw.split(' ').next().unwrap_or_default();
    let id = ObjectId::from_hex(sha.as_bytes())
        .map_err(|e| format!("invalid header '{}': {}", raw, e))?;
    let mut line = BlameLine::unattributed("");
    line.revision = (!id.is_null()).then_some(id);
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA_A: &str = "6e8a3c2b8d1f5a4e9c7b0d2f1e3a5c7b9d0f2e4a";
    const SHA_B: &str = "0a1b2c3d4e5f60718293a4b5c6d7e8f901234567";
    const ZERO: &str = "0000000000000000000000000000000000000000";

    fn block(sha: &str, line: usize, author: &str, time: i64, content: &str) -> String {
        format!(
            "{sha} {line} {line} 1\n\
             author {author}\n\
             author-mail <{author}@example.com>\n\
             author-time {time}\n\
             author-tz +0000\n\
             committer {author}\n\
             committer-mail <{author}@example.com>\n\
             committer-time {time}\n\
             committer-tz +0000\n\
             summary Some change\n\
             filename src/lib.rs\n\
             \t{content}\n"
        )
    }

    #[test]
    fn test_parse_lines() {
        let output = format!(
            "{}{}",
            block(SHA_A, 1, "Jane Doe", 1_700_000_000, "fn main() {"),
            block(SHA_B, 2, "John", 1_600_000_000, "\t// indented")
        );
        let lines = parse_porcelain(&output).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "fn main() {");
        assert_eq!(lines[0].author, "Jane Doe");
        assert_eq!(lines[0].time, 1_700_000_000);
        assert_eq!(lines[0].revision.unwrap().to_string(), SHA_A);
        assert_eq!(lines[1].text, "\t// indented");
        assert_eq!(lines[1].revision.unwrap().to_string(), SHA_B);
    }

    #[test]
    fn test_zero_id_is_unattributed() {
        let output = block(ZERO, 1, "Not Committed Yet", 1_700_000_000, "x");
        let lines = parse_porcelain(&output).unwrap();

        assert_eq!(lines, vec![BlameLine::unattributed("x")]);
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_porcelain("").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_output() {
        assert!(parse_porcelain("not-a-sha 1 1 1\n\tx\n").is_err());
        assert!(parse_porcelain("\tx\n").is_err());
        assert!(parse_porcelain(&format!("{} 1 1 1\nauthor a\n", SHA_A)).is_err());
    }
}
