//! Queued status queries and their completion callbacks.

use std::fmt;
use std::path::PathBuf;

use repostat_git::RepoHandle;
use repostat_types::{RepoStatus, TargetKind};

/// Completion callback. Runs on a worker task.
pub type Callback = Box<dyn FnOnce(Option<RepoStatus>) + Send + 'static>;

/// One queued status query.
///
/// Consumed by exactly one worker; the callback is invoked at most once.
/// Requests still queued when the pool closes are dropped without a
/// callback.
pub struct StatusRequest {
    pub repo: RepoHandle,
    pub path: PathBuf,
    pub kind: TargetKind,
    on_complete: Callback,
}

impl StatusRequest {
    pub fn new<F>(repo: RepoHandle, path: impl Into<PathBuf>, kind: TargetKind, on_complete: F) -> Self
    where
        F: FnOnce(Option<RepoStatus>) + Send + 'static,
    {
        Self {
            repo,
            path: path.into(),
            kind,
            on_complete: Box::new(on_complete),
        }
    }

    pub(crate) fn complete(self, result: Option<RepoStatus>) {
        (self.on_complete)(result);
    }
}

impl fmt::Debug for StatusRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRequest")
            .field("root", &self.repo.root())
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
