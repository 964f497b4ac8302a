use std::path::{Path, PathBuf};

use crate::error::{StageError, StageResult};

/// Name of the marker that identifies a working tree root. A directory in a
/// normal clone, a file in linked worktrees and submodules.
pub const GIT_MARKER: &str = ".git";

/// Walk up from `path` (or its directory, for files) to the nearest
/// directory containing a [`GIT_MARKER`].
pub fn find_repo_root(path: &Path) -> StageResult<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let start = if absolute.is_dir() {
        absolute.as_path()
    } else {
        absolute.parent().unwrap_or(&absolute)
    };
    start
        .ancestors()
        .find(|dir| dir.join(GIT_MARKER).exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| StageError::NotInRepository(absolute.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repostat_git::fixtures::TestRepo;
    use std::fs;

    #[test]
    fn finds_root_from_nested_directory() {
        let repo = TestRepo::init();
        repo.write("a/b/c.txt", "c\n");
        assert_eq!(find_repo_root(&repo.path("a/b")).unwrap(), repo.root());
    }

    #[test]
    fn finds_root_from_missing_file() {
        let repo = TestRepo::init();
        repo.write("a/keep.txt", "k\n");
        assert_eq!(find_repo_root(&repo.path("a/gone.txt")).unwrap(), repo.root());
    }

    #[test]
    fn accepts_git_file_marker() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GIT_MARKER), "gitdir: /elsewhere\n").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        assert_eq!(find_repo_root(&dir.path().join("src")).unwrap(), dir.path());
    }

    #[test]
    fn fails_outside_any_repository() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_repo_root(dir.path()).unwrap_err();
        assert!(matches!(err, StageError::NotInRepository(_)));
    }
}
