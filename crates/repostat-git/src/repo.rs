use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use git2::{ErrorCode, Index, IndexAddOption, ObjectType, Repository, Status, StatusOptions};
use repostat_types::{FileState, PathStatus, StatusTable};
use tracing::debug;

use crate::error::{GitError, GitResult};
use crate::head::HeadState;
use crate::paths::relativize;

/// A cheap, cloneable reference to a working tree.
///
/// Holds the canonical root path only; [`RepoHandle::open`] opens a fresh
/// [`GitRepo`] on the calling thread, since libgit2 repositories cannot be
/// shared between threads.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoHandle {
    root: PathBuf,
}

impl RepoHandle {
    /// Find the working tree containing `path` (a file or directory).
    pub fn discover(path: &Path) -> GitResult<Self> {
        let start = if path.is_dir() {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        let repo = Repository::discover(start).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitError::NotInRepository(path.to_path_buf()),
            _ => GitError::Git(e),
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| GitError::BareRepository(repo.path().to_path_buf()))?;
        Ok(Self {
            root: workdir.canonicalize()?,
        })
    }

    /// Canonical working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open the repository on the current thread.
    pub fn open(&self) -> GitResult<GitRepo> {
        let repo = Repository::open(&self.root)?;
        if repo.workdir().is_none() {
            return Err(GitError::BareRepository(self.root.clone()));
        }
        Ok(GitRepo {
            repo,
            root: self.root.clone(),
        })
    }
}

/// An opened working tree.
pub struct GitRepo {
    repo: Repository,
    root: PathBuf,
}

impl fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepo").field("root", &self.root).finish()
    }
}

impl GitRepo {
    /// Canonical working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn head_state(&self) -> HeadState {
        HeadState::read(&self.repo)
    }

    /// Repository-relative slash path of `path`.
    pub fn relative_path(&self, path: &Path) -> GitResult<String> {
        relativize(&self.root, path)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Working-tree status of every changed or untracked path. Ignored
    /// paths and submodules are not reported.
    pub fn status_table(&self) -> GitResult<StatusTable> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter_map(|entry| {
                let path = entry.path()?.to_string();
                Some((path, path_status(entry.status())))
            })
            .collect())
    }

    /// Read at most `cap` bytes of a working-copy file.
    pub fn read_worktree(&self, rel: &str, cap: usize) -> GitResult<Vec<u8>> {
        let file = File::open(self.root.join(rel))?;
        let mut buf = Vec::new();
        file.take(u64::try_from(cap).unwrap_or(u64::MAX))
            .read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read a file's content from the HEAD commit's tree, truncated to `cap`
    /// bytes when given.
    pub fn read_head_blob(&self, rel: &str, cap: Option<usize>) -> GitResult<Vec<u8>> {
        let tree = self.repo.head()?.peel_to_tree()?;
        let entry = tree.get_path(Path::new(rel))?;
        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;
        let content = blob.content();
        let end = cap.map_or(content.len(), |cap| content.len().min(cap));
        Ok(content[..end].to_vec())
    }

    /// The configured `core.excludesFile`, if any.
    pub fn excludes_file(&self) -> GitResult<Option<String>> {
        let config = self.repo.config()?;
        match config.get_string("core.excludesFile") {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `true` if the repository's own ignore rules exclude `rel`.
    pub fn is_ignored(&self, rel: &str) -> bool {
        self.repo.is_path_ignored(rel).unwrap_or(false)
    }

    // ---------------------------------------------------------------
    // Index updates
    // ---------------------------------------------------------------

    /// Stage one path. A path missing from the working tree is staged as a
    /// deletion.
    pub fn stage_path(&self, rel: &str) -> GitResult<()> {
        let mut index = self.repo.index()?;
        self.add_to_index(&mut index, rel)?;
        index.write()?;
        Ok(())
    }

    /// Stage several paths with a single index write.
    pub fn stage_paths<'a, I>(&self, rels: I) -> GitResult<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index = self.repo.index()?;
        let mut staged = 0;
        for rel in rels {
            self.add_to_index(&mut index, rel)?;
            staged += 1;
        }
        index.write()?;
        Ok(staged)
    }

    /// Stage everything beneath `rel_dir` (the whole tree when empty),
    /// including deletions.
    pub fn stage_tree(&self, rel_dir: &str) -> GitResult<()> {
        let spec = if rel_dir.is_empty() { "*" } else { rel_dir };
        let mut index = self.repo.index()?;
        index.add_all([spec], IndexAddOption::DEFAULT, None)?;
        index.update_all([spec], None)?;
        index.write()?;
        debug!(root = %self.root.display(), pathspec = spec, "staged tree");
        Ok(())
    }

    /// Reset one index entry to its HEAD state. With no commits yet the
    /// entry is removed from the index.
    pub fn unstage_path(&self, rel: &str) -> GitResult<()> {
        match self.repo.head().and_then(|head| head.peel(ObjectType::Commit)) {
            Ok(commit) => self.repo.reset_default(Some(&commit), [rel])?,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                let mut index = self.repo.index()?;
                index.remove_path(Path::new(rel))?;
                index.write()?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn add_to_index(&self, index: &mut Index, rel: &str) -> GitResult<()> {
        let path = Path::new(rel);
        if self.root.join(path).exists() {
            index.add_path(path)?;
        } else {
            index.remove_path(path)?;
        }
        Ok(())
    }
}

/// Split libgit2's combined status flags into worktree and staging states.
///
/// Untracked files report [`FileState::Untracked`] in both areas.
pub fn path_status(status: Status) -> PathStatus {
    let staging = if status.is_index_new() {
        FileState::Added
    } else if status.is_index_modified() || status.is_index_typechange() {
        FileState::Modified
    } else if status.is_index_deleted() {
        FileState::Deleted
    } else if status.is_index_renamed() {
        FileState::Renamed
    } else {
        FileState::Unmodified
    };

    let worktree = if status.is_wt_new() {
        FileState::Untracked
    } else if status.is_wt_modified() || status.is_wt_typechange() || status.is_conflicted() {
        FileState::Modified
    } else if status.is_wt_deleted() {
        FileState::Deleted
    } else if status.is_wt_renamed() {
        FileState::Renamed
    } else {
        FileState::Unmodified
    };

    if worktree == FileState::Untracked && staging == FileState::Unmodified {
        PathStatus::new(FileState::Untracked, FileState::Untracked)
    } else {
        PathStatus::new(worktree, staging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestRepo;

    #[test]
    fn discover_from_nested_file() {
        let repo = TestRepo::init();
        repo.write("src/deep/mod.rs", "x\n");
        let handle = RepoHandle::discover(&repo.path("src/deep/mod.rs")).unwrap();
        assert_eq!(handle.root(), repo.root());
    }

    #[test]
    fn discover_outside_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = RepoHandle::discover(dir.path()).unwrap_err();
        assert!(matches!(err, GitError::NotInRepository(_)));
    }

    #[test]
    fn status_table_classifies_paths() {
        let repo = TestRepo::init();
        repo.write("keep.txt", "k\n");
        repo.write("edit.txt", "1\n");
        repo.write("gone.txt", "g\n");
        repo.commit_all("init");

        repo.write("edit.txt", "2\n");
        repo.remove("gone.txt");
        repo.write("new/file.txt", "n\n");
        repo.write("staged.txt", "s\n");
        repo.handle().open().unwrap().stage_path("staged.txt").unwrap();

        let table = repo.handle().open().unwrap().status_table().unwrap();
        assert_eq!(table.get("keep.txt"), None);
        assert_eq!(
            table.get("edit.txt"),
            Some(&PathStatus::new(FileState::Modified, FileState::Unmodified))
        );
        assert_eq!(
            table.get("gone.txt"),
            Some(&PathStatus::new(FileState::Deleted, FileState::Unmodified))
        );
        assert_eq!(
            table.get("new/file.txt"),
            Some(&PathStatus::new(FileState::Untracked, FileState::Untracked))
        );
        assert_eq!(
            table.get("staged.txt"),
            Some(&PathStatus::new(FileState::Unmodified, FileState::Added))
        );
    }

    #[test]
    fn clean_repository_has_clean_table() {
        let repo = TestRepo::init();
        repo.write("a.txt", "a\n");
        repo.commit_all("init");
        assert!(repo.handle().open().unwrap().status_table().unwrap().is_clean());
    }

    #[test]
    fn worktree_read_is_capped() {
        let repo = TestRepo::init();
        repo.write("big.txt", "0123456789");
        let git = repo.handle().open().unwrap();
        assert_eq!(git.read_worktree("big.txt", 4).unwrap(), b"0123");
        assert!(git.read_worktree("missing.txt", 4).unwrap_err().is_not_found());
    }

    #[test]
    fn head_blob_read() {
        let repo = TestRepo::init();
        repo.write("a.txt", "committed\n");
        repo.commit_all("init");
        repo.write("a.txt", "changed\n");

        let git = repo.handle().open().unwrap();
        assert_eq!(git.read_head_blob("a.txt", None).unwrap(), b"committed\n");
        assert_eq!(git.read_head_blob("a.txt", Some(3)).unwrap(), b"com");
        assert!(git.read_head_blob("nope.txt", None).is_err());
    }

    #[test]
    fn unstage_restores_head_state() {
        let repo = TestRepo::init();
        repo.write("a.txt", "a\n");
        repo.commit_all("init");
        repo.write("a.txt", "b\n");

        let git = repo.handle().open().unwrap();
        git.stage_path("a.txt").unwrap();
        assert_eq!(
            git.status_table().unwrap().get("a.txt").map(|s| s.staging),
            Some(FileState::Modified)
        );

        git.unstage_path("a.txt").unwrap();
        assert_eq!(
            git.status_table().unwrap().get("a.txt"),
            Some(&PathStatus::new(FileState::Modified, FileState::Unmodified))
        );
    }

    #[test]
    fn unstage_without_commits_removes_entry() {
        let repo = TestRepo::init();
        repo.write("a.txt", "a\n");
        let git = repo.handle().open().unwrap();
        git.stage_path("a.txt").unwrap();
        git.unstage_path("a.txt").unwrap();
        assert_eq!(
            git.status_table().unwrap().get("a.txt"),
            Some(&PathStatus::new(FileState::Untracked, FileState::Untracked))
        );
    }

    #[test]
    fn staging_a_missing_file_stages_its_deletion() {
        let repo = TestRepo::init();
        repo.write("a.txt", "a\n");
        repo.commit_all("init");
        repo.remove("a.txt");

        let git = repo.handle().open().unwrap();
        git.stage_path("a.txt").unwrap();
        assert_eq!(
            git.status_table().unwrap().get("a.txt"),
            Some(&PathStatus::new(FileState::Unmodified, FileState::Deleted))
        );
    }

    #[test]
    fn excludes_file_follows_repository_config() {
        let repo = TestRepo::init();
        let git = repo.handle().open().unwrap();
        repo.repo()
            .config()
            .unwrap()
            .set_str("core.excludesFile", "~/.gitignore_global")
            .unwrap();
        assert_eq!(
            git.excludes_file().unwrap().as_deref(),
            Some("~/.gitignore_global")
        );
    }
}
