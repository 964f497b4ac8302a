//! Foundation types for repostat.
//!
//! This crate provides the data model shared by every other repostat crate:
//! the aggregate change summary handed back to callers and the per-path
//! status table read from the version-control library.
//!
//! # Key Types
//!
//! - [`RepoStatus`]: Branch name plus changed-file and line counts for a query
//! - [`FileGitStatus`]: Insertions/deletions for a single file
//! - [`Completeness`]: Whether a status was fully or partially resolved
//! - [`TargetKind`]: File or directory query discriminator
//! - [`FileState`] / [`PathStatus`]: Worktree and staging state of one path
//! - [`StatusTable`]: Repository-relative path to [`PathStatus`] map

pub mod state;
pub mod status;

pub use state::{FileState, PathStatus, StatusTable};
pub use status::{Completeness, FileGitStatus, RepoStatus, TargetKind};
