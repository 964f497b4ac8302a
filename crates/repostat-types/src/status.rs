//! Aggregate status types returned by the resolver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Branch name used when HEAD cannot be resolved at all.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Whether a [`RepoStatus`] covers everything that was asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    /// Every step of the computation ran to the end.
    #[default]
    Complete,
    /// The computation stopped early (cancellation or an unreadable status
    /// table). Counts are a lower bound.
    Partial,
}

/// What kind of path a status query targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A single file: `files_changed` is 0 or 1.
    File,
    /// A directory: every changed entry beneath it is aggregated.
    Directory,
}

impl TargetKind {
    /// Classify a path by looking at the filesystem. Missing paths are
    /// treated as files (a deleted file is still a valid query target).
    pub fn of(path: &std::path::Path) -> Self {
        if path.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }
}

/// Summary of uncommitted change for a file or directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStatus {
    /// Short branch name, 7-character commit prefix when detached, or a
    /// policy default when HEAD cannot be resolved.
    pub branch: String,
    /// Number of changed files under the query target.
    pub files_changed: usize,
    /// Inserted lines across all changed files.
    pub insertions: usize,
    /// Deleted lines across all changed files.
    pub deletions: usize,
    /// Whether the counts are complete or a lower bound.
    pub completeness: Completeness,
}

impl RepoStatus {
    /// A status with only the branch known and all counts zero.
    pub fn new(branch: impl Into<String>) -> Self {
        Self {
            branch: branch.into(),
            ..Default::default()
        }
    }

    /// Returns `true` if no file under the target has changed.
    pub fn is_clean(&self) -> bool {
        self.files_changed == 0 && self.insertions == 0 && self.deletions == 0
    }

    /// Returns `true` if the computation stopped before finishing.
    pub fn is_partial(&self) -> bool {
        self.completeness == Completeness::Partial
    }

    /// Mark this status as a lower bound.
    pub fn into_partial(mut self) -> Self {
        self.completeness = Completeness::Partial;
        self
    }

    /// Add one file's line delta to the totals.
    pub fn add_delta(&mut self, delta: FileGitStatus) {
        self.insertions += delta.insertions;
        self.deletions += delta.deletions;
    }

    /// The line delta without the file count.
    pub fn file_delta(&self) -> FileGitStatus {
        FileGitStatus {
            insertions: self.insertions,
            deletions: self.deletions,
        }
    }

    /// Compact badge: `main±0` when clean, `main📄3+10-2` when dirty.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            write!(f, "{}±0", self.branch)
        } else {
            write!(
                f,
                "{}📄{}+{}-{}",
                self.branch, self.files_changed, self.insertions, self.deletions
            )
        }
    }
}

/// Line delta of a single file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGitStatus {
    pub insertions: usize,
    pub deletions: usize,
}

impl FileGitStatus {
    pub fn new(insertions: usize, deletions: usize) -> Self {
        Self {
            insertions,
            deletions,
        }
    }
}

impl From<RepoStatus> for FileGitStatus {
    fn from(status: RepoStatus) -> Self {
        status.file_delta()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_status_is_clean_and_complete() {
        let status = RepoStatus::new("main");
        assert!(status.is_clean());
        assert!(!status.is_partial());
        assert_eq!(status.branch, "main");
    }

    #[test]
    fn render_clean_badge() {
        assert_eq!(RepoStatus::new("main").render(), "main±0");
    }

    #[test]
    fn render_dirty_badge() {
        let status = RepoStatus {
            branch: "feature/x".into(),
            files_changed: 3,
            insertions: 10,
            deletions: 2,
            completeness: Completeness::Complete,
        };
        assert_eq!(status.render(), "feature/x📄3+10-2");
    }

    #[test]
    fn add_delta_accumulates() {
        let mut status = RepoStatus::new("main");
        status.add_delta(FileGitStatus::new(4, 1));
        status.add_delta(FileGitStatus::new(2, 3));
        assert_eq!(status.file_delta(), FileGitStatus::new(6, 4));
    }

    #[test]
    fn partial_marker_survives_serialization() {
        let status = RepoStatus::new("main").into_partial();
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"completeness\":\"partial\""));
        let back: RepoStatus = serde_json::from_str(&json).unwrap();
        assert!(back.is_partial());
    }

    #[test]
    fn missing_path_is_a_file_target() {
        let path = std::path::Path::new("/definitely/not/here.txt");
        assert_eq!(TargetKind::of(path), TargetKind::File);
    }
}
