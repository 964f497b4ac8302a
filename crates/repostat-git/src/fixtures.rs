//! Throwaway repositories for tests.
//!
//! Enabled for this crate's own tests and, through the `fixtures` feature,
//! for dependent crates' dev-dependencies.

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Commit, IndexAddOption, Oid, Repository, RepositoryInitOptions, Signature};
use tempfile::TempDir;

use crate::repo::RepoHandle;

/// A repository in a temporary directory, deleted on drop.
pub struct TestRepo {
    repo: Repository,
    root: PathBuf,
    _dir: TempDir,
}

impl TestRepo {
    /// Initialize an empty repository whose HEAD names `main`.
    pub fn init() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().canonicalize().expect("canonicalize temp dir");

        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(&root, &opts).expect("init repository");

        let mut config = repo.config().expect("open config");
        config.set_str("user.name", "repostat").expect("set user.name");
        config
            .set_str("user.email", "repostat@example.com")
            .expect("set user.email");

        Self {
            repo,
            root,
            _dir: dir,
        }
    }

    /// Canonical working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a repository-relative path.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    pub fn handle(&self) -> RepoHandle {
        RepoHandle::discover(&self.root).expect("discover test repository")
    }

    /// Write a working-copy file, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(path, content).expect("write file");
    }

    /// Delete a working-copy file.
    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.path(rel)).expect("remove file");
    }

    /// Stage every change (including deletions) and commit it on HEAD.
    pub fn commit_all(&self, message: &str) -> Oid {
        let mut index = self.repo.index().expect("open index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("add all");
        index.update_all(["*"], None).expect("update all");
        index.write().expect("write index");

        let tree_id = index.write_tree().expect("write tree");
        let tree = self.repo.find_tree(tree_id).expect("find tree");
        let sig = Signature::now("repostat", "repostat@example.com").expect("signature");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }
}
