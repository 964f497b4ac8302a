use std::path::PathBuf;

use repostat_git::GitError;

/// Errors from staging operations.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("not inside a repository: {0}")]
    NotInRepository(PathBuf),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl StageError {
    /// Lift a git error, keeping "not in a repository" distinguishable.
    pub(crate) fn from_git(err: GitError) -> Self {
        match err {
            GitError::NotInRepository(path) => Self::NotInRepository(path),
            other => Self::Git(other),
        }
    }
}

/// Result type alias for staging operations.
pub type StageResult<T> = Result<T, StageError>;
