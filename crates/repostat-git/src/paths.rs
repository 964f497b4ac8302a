//! Repository-relative path helpers.
//!
//! Status tables are keyed by slash-separated paths relative to the working
//! tree root. These helpers turn arbitrary caller paths (relative, through
//! symlinks, possibly already deleted) into that form.

use std::path::{Component, Path, PathBuf};

use crate::error::{GitError, GitResult};

/// Resolve symlinks in `path`, tolerating a missing tail.
///
/// The deepest existing ancestor is canonicalized and the remaining
/// components are appended unchanged, so a deleted file still resolves to
/// its location inside a symlinked directory.
pub fn resolve_symlinks(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolve_symlinks(parent).join(name),
        _ => path.to_path_buf(),
    }
}

/// Join the normal components of a relative path with `/`.
///
/// Returns `None` for absolute paths, `..` components, or non-UTF-8 names.
pub fn to_slash(rel: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_str()?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

/// Express `path` relative to the canonical `root` as a slash path.
///
/// The root itself maps to the empty string.
pub fn relativize(root: &Path, path: &Path) -> GitResult<String> {
    let absolute = std::path::absolute(path)?;
    let resolved = resolve_symlinks(&absolute);
    let rel = resolved
        .strip_prefix(root)
        .map_err(|_| GitError::OutsideRepository {
            path: resolved.clone(),
            root: root.to_path_buf(),
        })?;
    to_slash(rel).ok_or_else(|| GitError::InvalidPath(resolved.clone()))
}
