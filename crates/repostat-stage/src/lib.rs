//! Index staging for repostat.
//!
//! [`StagingController`] answers whether a path has anything to stage and
//! moves paths into and out of the index. Paths may be given relative to
//! the current directory, through symlinks, or already deleted.

pub mod controller;
pub mod error;
pub mod paths;

pub use controller::StagingController;
pub use error::{StageError, StageResult};
pub use paths::find_repo_root;
