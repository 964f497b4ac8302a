//! Per-path working tree state.
//!
//! These types mirror what the version-control library reports for each
//! path: one state for the working tree and one for the staging area.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The state of a path in either the working tree or the staging area.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileState {
    #[default]
    Unmodified,
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
    Untracked,
}

/// Worktree and staging state of one path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStatus {
    pub worktree: FileState,
    pub staging: FileState,
}

impl PathStatus {
    pub fn new(worktree: FileState, staging: FileState) -> Self {
        Self { worktree, staging }
    }

    /// Returns `true` if neither area reports a change.
    pub fn is_unmodified(&self) -> bool {
        self.worktree == FileState::Unmodified && self.staging == FileState::Unmodified
    }

    pub fn is_untracked(&self) -> bool {
        self.worktree == FileState::Untracked
    }

    /// Deleted in the working tree or staged for deletion.
    pub fn is_deleted(&self) -> bool {
        self.worktree == FileState::Deleted || self.staging == FileState::Deleted
    }
}

/// Status of every reported path, keyed by repository-relative slash path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusTable {
    entries: BTreeMap<String, PathStatus>,
}

impl StatusTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, status: PathStatus) {
        self.entries.insert(path.into(), status);
    }

    pub fn get(&self, path: &str) -> Option<&PathStatus> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if no path carries a change in either area.
    pub fn is_clean(&self) -> bool {
        self.entries.values().all(PathStatus::is_unmodified)
    }

    /// Entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PathStatus)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries at or beneath `dir` (a slash path; empty means the root).
    pub fn under<'a>(&'a self, dir: &'a str) -> impl Iterator<Item = (&'a str, &'a PathStatus)> {
        let dir = dir.trim_end_matches('/');
        self.iter().filter(move |(path, _)| {
            dir.is_empty()
                || *path == dir
                || (path.starts_with(dir) && path.as_bytes().get(dir.len()) == Some(&b'/'))
        })
    }
}

impl FromIterator<(String, PathStatus)> for StatusTable {
    fn from_iter<T: IntoIterator<Item = (String, PathStatus)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
