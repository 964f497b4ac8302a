//! HEAD resolution and the branch-name policy.
//!
//! HEAD is either a symbolic ref naming the current branch, a detached
//! commit, or (in a fresh repository) a reference that does not resolve yet.

use git2::{ErrorCode, Repository};
use repostat_types::status::UNKNOWN_BRANCH;

/// Length of the abbreviated commit hash shown for a detached HEAD.
pub const SHORT_HASH_LEN: usize = 7;

/// What HEAD currently points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadState {
    /// HEAD names a branch with at least one commit.
    Branch(String),
    /// HEAD points directly at a commit (full hex id).
    Detached(String),
    /// HEAD does not resolve: no such reference, or a branch with no
    /// commits yet.
    Unborn,
    /// HEAD resolved to a reference without a target (or a zero id).
    NoTarget,
    /// HEAD could not be read.
    Unreadable(String),
}

impl HeadState {
    /// Read HEAD from `repo`.
    ///
    /// Failures are classified by [`git2::ErrorCode`]; message text is never
    /// inspected.
    pub fn read(repo: &Repository) -> Self {
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Self::Unborn;
            }
            Err(e) => return Self::Unreadable(e.message().to_string()),
        };

        match head.target() {
            Some(oid) if !oid.is_zero() => match head.shorthand() {
                Some(name) if head.is_branch() => Self::Branch(name.to_string()),
                _ => Self::Detached(oid.to_string()),
            },
            _ => Self::NoTarget,
        }
    }

    /// Branch name to report.
    ///
    /// - on a branch: its short name
    /// - detached: the first seven hex digits of the commit
    /// - unborn: `default_branch`
    /// - anything else: `"unknown"`
    pub fn branch_name(&self, default_branch: &str) -> String {
        match self {
            Self::Branch(name) => name.clone(),
            Self::Detached(hex) => hex.chars().take(SHORT_HASH_LEN).collect(),
            Self::Unborn => default_branch.to_string(),
            Self::NoTarget | Self::Unreadable(_) => UNKNOWN_BRANCH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestRepo;

    #[test]
    fn policy_for_each_state() {
        assert_eq!(HeadState::Branch("dev".into()).branch_name("master"), "dev");
        assert_eq!(
            HeadState::Detached("0123456789abcdef".into()).branch_name("master"),
            "0123456"
        );
        assert_eq!(HeadState::Unborn.branch_name("master"), "master");
        assert_eq!(HeadState::Unborn.branch_name("trunk"), "trunk");
        assert_eq!(HeadState::NoTarget.branch_name("master"), "unknown");
        assert_eq!(HeadState::Unreadable("boom".into()).branch_name("master"), "unknown");
    }

    #[test]
    fn fresh_repository_reports_the_default_branch() {
        let repo = TestRepo::init();
        let state = HeadState::read(repo.repo());
        assert_eq!(state, HeadState::Unborn);
        // HEAD names `main`, but nothing resolves yet.
        assert_eq!(state.branch_name("master"), "master");
    }

    #[test]
    fn committed_repository_is_on_branch() {
        let repo = TestRepo::init();
        repo.write("a.txt", "a\n");
        repo.commit_all("init");
        assert_eq!(HeadState::read(repo.repo()), HeadState::Branch("main".into()));
    }

    #[test]
    fn detached_head_reports_short_hash() {
        let repo = TestRepo::init();
        repo.write("a.txt", "a\n");
        let oid = repo.commit_all("init");
        repo.repo().set_head_detached(oid).unwrap();

        let state = HeadState::read(repo.repo());
        assert_eq!(state, HeadState::Detached(oid.to_string()));
        assert_eq!(state.branch_name("master"), &oid.to_string()[..7]);
    }
}
