//! The status computation pipeline.
//!
//! [`StatusResolver::resolve`] runs each query through the same stages:
//!
//! 1. take the repository's lock (cancellable)
//! 2. resolve HEAD to a branch name
//! 3. take a global limiter slot (cancellable)
//! 4. read the status table and aggregate per-file line deltas
//!
//! Blocking libgit2 and filesystem work runs on tokio's blocking pool. The
//! repository guard and limiter permit move into those blocking jobs, so a
//! caller that drops the future early cannot release either while work on
//! the repository is still queued or running. Every failure past step 1
//! degrades to a result with fewer counts rather than an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use repostat_diff::{count_lines, line_delta};
use repostat_git::{GitRepo, RepoHandle};
use repostat_ignore::IgnoreMatcher;
use repostat_types::{FileGitStatus, PathStatus, RepoStatus, StatusTable, TargetKind};
use tokio::task;
use tracing::{debug, warn};

use crate::cancel::CancelSignal;
use crate::config::ResolverConfig;
use crate::limiter::ConcurrencyLimiter;
use crate::locks::LockRegistry;

/// Computes repository status under per-repository mutual exclusion and a
/// global concurrency limit.
///
/// One resolver is meant to be shared (behind an `Arc`) by every caller in a
/// process so that they all see the same locks and limiter.
#[derive(Debug)]
pub struct StatusResolver {
    locks: Arc<LockRegistry>,
    limiter: ConcurrencyLimiter,
    config: ResolverConfig,
}

impl StatusResolver {
    pub fn new(config: ResolverConfig) -> Self {
        let limiter = ConcurrencyLimiter::new(config.limiter_capacity);
        Self::with_parts(config, Arc::new(LockRegistry::new()), limiter)
    }

    /// Build a resolver around an existing lock registry and limiter.
    pub fn with_parts(
        config: ResolverConfig,
        locks: Arc<LockRegistry>,
        limiter: ConcurrencyLimiter,
    ) -> Self {
        Self {
            locks,
            limiter,
            config,
        }
    }

    pub fn locks(&self) -> &Arc<LockRegistry> {
        &self.locks
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Compute the status of `target` inside `repo`.
    ///
    /// Returns `None` when cancelled while waiting for the repository lock,
    /// or when the repository cannot be opened. Once HEAD has been resolved
    /// a result is always returned; cancellation from that point on marks it
    /// [`Completeness::Partial`](repostat_types::Completeness::Partial).
    pub async fn resolve(
        &self,
        repo: &RepoHandle,
        target: &Path,
        kind: TargetKind,
        cancel: &CancelSignal,
    ) -> Option<RepoStatus> {
        let root = repo.root();

        // ---------------------------------------------------------------
        // Repository lock
        // ---------------------------------------------------------------
        let lock = self.locks.lock_for(root);
        let guard = tokio::select! {
            biased;
            guard = lock.acquire() => guard,
            () = cancel.cancelled() => {
                debug!(root = %root.display(), "cancelled waiting for repository lock");
                return None;
            }
        };

        // ---------------------------------------------------------------
        // HEAD
        // ---------------------------------------------------------------
        let handle = repo.clone();
        let default_branch = self.config.default_branch.clone();
        let opened = task::spawn_blocking(move || {
            let opened = handle.open().map(|git| {
                let branch = git.head_state().branch_name(&default_branch);
                (git, branch)
            });
            (guard, opened)
        })
        .await;
        let (guard, git, branch) = match opened {
            Ok((guard, Ok((git, branch)))) => (guard, git, branch),
            Ok((_, Err(e))) => {
                debug!(root = %root.display(), error = %e, "cannot open repository");
                return None;
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "head resolution task failed");
                return None;
            }
        };
        let status = RepoStatus::new(branch);

        if cancel.is_cancelled() {
            debug!(root = %root.display(), "cancelled after head resolution");
            return Some(status.into_partial());
        }

        // ---------------------------------------------------------------
        // Limiter slot
        // ---------------------------------------------------------------
        let Some(permit) = self.limiter.acquire(cancel).await else {
            debug!(root = %root.display(), "cancelled waiting for limiter slot");
            return Some(status.into_partial());
        };

        // ---------------------------------------------------------------
        // Aggregation
        // ---------------------------------------------------------------
        let fallback = status.clone().into_partial();
        let job = Aggregation {
            git,
            target: target.to_path_buf(),
            kind,
            read_cap: self.config.read_cap_bytes,
            cancel: cancel.clone(),
        };
        let aggregated = task::spawn_blocking(move || {
            let _held = (guard, permit);
            job.run(status)
        })
        .await;
        match aggregated {
            Ok(status) => {
                debug!(
                    root = %root.display(),
                    files = status.files_changed,
                    insertions = status.insertions,
                    deletions = status.deletions,
                    partial = status.is_partial(),
                    "resolved status"
                );
                Some(status)
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "status task failed");
                Some(fallback)
            }
        }
    }

    /// Status of a single file, without the branch name.
    pub async fn file_status(
        &self,
        repo: &RepoHandle,
        path: &Path,
        cancel: &CancelSignal,
    ) -> Option<FileGitStatus> {
        self.resolve(repo, path, TargetKind::File, cancel)
            .await
            .map(FileGitStatus::from)
    }
}

/// The blocking half of a status query.
struct Aggregation {
    git: GitRepo,
    target: PathBuf,
    kind: TargetKind,
    read_cap: usize,
    cancel: CancelSignal,
}

impl Aggregation {
    fn run(self, status: RepoStatus) -> RepoStatus {
        let table = match self.git.status_table() {
            Ok(table) => table,
            Err(e) => {
                debug!(root = %self.git.root().display(), error = %e, "status table unavailable");
                return status.into_partial();
            }
        };
        if table.is_clean() {
            return status;
        }

        let rel = match self.git.relative_path(&self.target) {
            Ok(rel) => rel,
            Err(e) => {
                debug!(target = %self.target.display(), error = %e, "cannot relativize target");
                return status.into_partial();
            }
        };

        match self.kind {
            TargetKind::Directory => self.directory(&table, &rel, status),
            TargetKind::File => self.file(&table, &rel, status),
        }
    }

    fn directory(&self, table: &StatusTable, rel_dir: &str, status: RepoStatus) -> RepoStatus {
        let excludes = self.git.excludes_file().unwrap_or_else(|e| {
            debug!(error = %e, "cannot read core.excludesFile");
            None
        });
        let matcher = IgnoreMatcher::load(self.git.root(), excludes.as_deref());

        self.accumulate(table.under(rel_dir), &matcher, status)
    }

    /// Count every changed, non-ignored entry, stopping with a partial
    /// result if cancellation fires between entries.
    fn accumulate<'a, I>(&self, entries: I, matcher: &IgnoreMatcher, mut status: RepoStatus) -> RepoStatus
    where
        I: IntoIterator<Item = (&'a str, &'a PathStatus)>,
    {
        for (path, state) in entries {
            if self.cancel.is_cancelled() {
                debug!(files = status.files_changed, "cancelled during aggregation");
                return status.into_partial();
            }
            if state.is_unmodified() || matcher.is_ignored(path) {
                continue;
            }
            status.files_changed += 1;
            status.add_delta(self.delta(path, state));
        }
        status
    }

    fn file(&self, table: &StatusTable, rel: &str, mut status: RepoStatus) -> RepoStatus {
        match table.get(rel) {
            Some(state) if !state.is_unmodified() => {
                status.files_changed = 1;
                status.add_delta(self.delta(rel, state));
                status
            }
            _ => status,
        }
    }

    /// Line delta of one changed path. Unreadable content counts as zero.
    fn delta(&self, path: &str, state: &PathStatus) -> FileGitStatus {
        if state.is_untracked() {
            return match self.git.read_worktree(path, self.read_cap) {
                Ok(content) => FileGitStatus::new(count_lines(&content), 0),
                Err(e) => {
                    debug!(path, error = %e, "cannot read untracked file");
                    FileGitStatus::default()
                }
            };
        }

        if state.is_deleted() {
            return match self.git.read_head_blob(path, None) {
                Ok(content) => FileGitStatus::new(0, count_lines(&content)),
                Err(e) => {
                    debug!(path, error = %e, "cannot read deleted file from HEAD");
                    FileGitStatus::default()
                }
            };
        }

        let current = match self.git.read_worktree(path, self.read_cap) {
            Ok(content) => content,
            Err(e) => {
                debug!(path, error = %e, "cannot read working copy");
                return FileGitStatus::default();
            }
        };
        match self.git.read_head_blob(path, Some(self.read_cap)) {
            Ok(previous) => line_delta(&previous, &current),
            // Not in HEAD (staged new file, or no commits yet).
            Err(_) => FileGitStatus::new(count_lines(&current), 0),
        }
    }
}
