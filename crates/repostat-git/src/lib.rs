//! Version-control boundary for repostat.
//!
//! Everything that touches repository internals goes through this crate:
//! discovering a working tree, resolving HEAD, reading the working-tree
//! status table, reading file content from the working copy or the HEAD
//! tree, and updating the index. All calls are blocking; async callers run
//! them on a blocking thread.
//!
//! # Modules
//!
//! - [`error`]: Error types for repository access
//! - [`head`]: [`HeadState`] and the branch-name policy
//! - [`paths`]: Repository-relative slash path helpers
//! - [`repo`]: [`RepoHandle`] and the opened [`GitRepo`]

pub mod error;
pub mod head;
pub mod paths;
pub mod repo;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::{GitError, GitResult};
pub use head::HeadState;
pub use paths::{relativize, resolve_symlinks, to_slash};
pub use repo::{path_status, GitRepo, RepoHandle};
