use std::path::Path;

use repostat_git::{GitRepo, RepoHandle};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{StageError, StageResult};
use crate::paths::{find_repo_root, GIT_MARKER};

/// Stages and unstages working-tree paths.
///
/// Each call opens the repository afresh; nothing is cached between calls.
/// Staging does not take the status resolver's repository locks.
#[derive(Clone, Copy, Debug, Default)]
pub struct StagingController;

impl StagingController {
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` if `path` differs from HEAD in the working tree or the
    /// index. Paths outside any repository yield `Ok(false)`.
    pub fn can_be_staged(&self, path: &Path) -> StageResult<bool> {
        let (git, rel) = match open(path) {
            Ok(opened) => opened,
            Err(StageError::NotInRepository(_)) => return Ok(false),
            Err(e) => return Err(e),
        };
        let table = git.status_table()?;
        Ok(table.get(&rel).is_some_and(|state| !state.is_unmodified()))
    }

    /// Stage one file. A file missing from the working tree is staged as a
    /// deletion.
    pub fn stage_file(&self, path: &Path) -> StageResult<()> {
        let (git, rel) = open(path)?;
        git.stage_path(&rel)?;
        info!(root = %git.root().display(), path = %rel, "staged");
        Ok(())
    }

    /// Reset one file's index entry to HEAD.
    pub fn unstage_file(&self, path: &Path) -> StageResult<()> {
        let (git, rel) = open(path)?;
        git.unstage_path(&rel)?;
        info!(root = %git.root().display(), path = %rel, "unstaged");
        Ok(())
    }

    /// Stage a directory.
    ///
    /// Non-recursive mode stages the directory's immediate files only,
    /// skipping subdirectories and anything the repository ignores.
    /// Recursive mode stages the whole subtree, deletions included.
    pub fn stage_directory(&self, path: &Path, recursive: bool) -> StageResult<()> {
        let (git, rel) = open(path)?;

        if recursive {
            git.stage_tree(&rel)?;
            info!(root = %git.root().display(), dir = %rel, "staged directory tree");
            return Ok(());
        }

        let dir = git.root().join(&rel);
        let mut children = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let file_type = entry.file_type();
            if !(file_type.is_file() || file_type.is_symlink()) {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                debug!(path = %entry.path().display(), "skipping non UTF-8 name");
                continue;
            };
            if name == GIT_MARKER {
                continue;
            }
            let child = if rel.is_empty() {
                name.to_string()
            } else {
                format!("{rel}/{name}")
            };
            if git.is_ignored(&child) {
                debug!(path = %child, "skipping ignored file");
                continue;
            }
            children.push(child);
        }

        let staged = git.stage_paths(children.iter().map(String::as_str))?;
        info!(root = %git.root().display(), dir = %rel, staged, "staged directory files");
        Ok(())
    }
}

/// Open the repository containing `path` and relativize `path` against it.
fn open(path: &Path) -> StageResult<(GitRepo, String)> {
    let root = find_repo_root(path)?;
    let git = RepoHandle::discover(&root)
        .and_then(|handle| handle.open())
        .map_err(StageError::from_git)?;
    let rel = git.relative_path(path)?;
    Ok((git, rel))
}
