//! Error types for repository access.

use std::path::PathBuf;

/// Errors that can occur while reading or updating a repository.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// No repository was found at or above the path.
    #[error("not inside a git repository: {}", .0.display())]
    NotInRepository(PathBuf),

    /// The repository has no working tree.
    #[error("bare repository has no working tree: {}", .0.display())]
    BareRepository(PathBuf),

    /// The path does not live under the repository root.
    #[error("{} is outside repository root {}", .path.display(), .root.display())]
    OutsideRepository { path: PathBuf, root: PathBuf },

    /// The path cannot be expressed as a repository-relative slash path.
    #[error("invalid repository path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// libgit2 reported an error.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitError {
    /// Returns `true` for "the thing asked for does not exist" failures.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Git(e) => e.code() == git2::ErrorCode::NotFound,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Convenience alias for repository results.
pub type GitResult<T> = Result<T, GitError>;
