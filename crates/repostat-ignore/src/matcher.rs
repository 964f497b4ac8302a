use std::fmt;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, warn};

use crate::error::IgnoreError;

/// Patterns used when no excludes file is available.
pub const DEFAULT_PATTERNS: &[&str] = &[".DS_Store"];

/// Where the active pattern set came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternSource {
    /// No patterns: nothing is ignored.
    None,
    /// The built-in [`DEFAULT_PATTERNS`].
    Default,
    /// Patterns read from this excludes file.
    ExcludesFile(PathBuf),
    /// Patterns supplied directly by the caller.
    Inline,
}

/// Compiled exclusion patterns for one repository root.
pub struct IgnoreMatcher {
    inner: Option<Gitignore>,
    source: PatternSource,
}

impl fmt::Debug for IgnoreMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreMatcher")
            .field("source", &self.source)
            .field("patterns", &self.inner.as_ref().map_or(0, Gitignore::num_ignores))
            .finish()
    }
}

impl IgnoreMatcher {
    /// A matcher that never ignores anything.
    pub fn none() -> Self {
        Self {
            inner: None,
            source: PatternSource::None,
        }
    }

    /// The built-in fallback matcher.
    pub fn default_for(root: &Path) -> Self {
        match Self::compile(root, DEFAULT_PATTERNS.iter().copied()) {
            Ok(inner) => Self {
                inner: Some(inner),
                source: PatternSource::Default,
            },
            Err(e) => {
                warn!(error = %e, "built-in exclusion patterns failed to compile");
                Self::none()
            }
        }
    }

    /// Compile an explicit pattern list.
    pub fn from_patterns<I, S>(root: &Path, patterns: I) -> Result<Self, IgnoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            inner: Some(Self::compile(root, patterns)?),
            source: PatternSource::Inline,
        })
    }

    /// Load patterns for `root` given the configured `core.excludesFile`
    /// value, using the current user's home directory for `~` expansion.
    ///
    /// Never fails: any problem falls back to [`DEFAULT_PATTERNS`].
    pub fn load(root: &Path, excludes_setting: Option<&str>) -> Self {
        Self::load_with_home(root, excludes_setting, dirs::home_dir().as_deref())
    }

    /// Like [`Self::load`] with an explicit home directory.
    pub fn load_with_home(root: &Path, excludes_setting: Option<&str>, home: Option<&Path>) -> Self {
        let setting = match excludes_setting.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => {
                debug!("no excludes file configured, using built-in patterns");
                return Self::default_for(root);
            }
        };

        match Self::read_excludes(root, setting, home) {
            Ok(matcher) => matcher,
            Err(e) => {
                debug!(error = %e, "excludes file unavailable, using built-in patterns");
                Self::default_for(root)
            }
        }
    }

    fn read_excludes(root: &Path, setting: &str, home: Option<&Path>) -> Result<Self, IgnoreError> {
        let path = expand_home(setting, home)?;
        let text = std::fs::read_to_string(&path).map_err(|source| IgnoreError::Read {
            path: path.clone(),
            source,
        })?;
        let inner = Self::compile(root, parse_patterns(&text))?;
        Ok(Self {
            inner: Some(inner),
            source: PatternSource::ExcludesFile(path),
        })
    }

    fn compile<I, S>(root: &Path, patterns: I) -> Result<Gitignore, IgnoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if let Err(e) = builder.add_line(None, pattern) {
                warn!(pattern, error = %e, "skipping invalid exclusion pattern");
            }
        }
        Ok(builder.build()?)
    }

    /// Where the patterns came from.
    pub fn source(&self) -> &PatternSource {
        &self.source
    }

    /// Returns `true` if the repository-relative slash path, or any of its
    /// parent directories, matches an exclusion pattern. Paths are always
    /// tested as files.
    pub fn is_ignored(&self, path: &str) -> bool {
        let Some(inner) = &self.inner else {
            return false;
        };
        let rel = path.trim_start_matches('/');
        if rel.is_empty() {
            return false;
        }
        let segments: PathBuf = rel.split('/').filter(|s| !s.is_empty()).collect();
        inner.matched_path_or_any_parents(&segments, false).is_ignore()
    }
}

/// Parse an excludes file: one pattern per line, skipping blank lines and
/// `#` comments, with trailing carriage returns removed.
pub fn parse_patterns(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Expand a leading `~` or `~/` against `home`.
pub fn expand_home(path: &str, home: Option<&Path>) -> Result<PathBuf, IgnoreError> {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return Ok(PathBuf::from(path));
    };
    let home = home.ok_or_else(|| IgnoreError::NoHomeDir(path.to_string()))?;
    Ok(if rest.is_empty() {
        home.to_path_buf()
    } else {
        home.join(rest)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/repo")
    }

    #[test]
    fn none_matcher_never_ignores() {
        let m = IgnoreMatcher::none();
        assert!(!m.is_ignored(".DS_Store"));
        assert!(!m.is_ignored("a/b/c.txt"));
    }

    #[test]
    fn missing_setting_uses_default_patterns() {
        let m = IgnoreMatcher::load_with_home(&root(), None, None);
        assert_eq!(m.source(), &PatternSource::Default);
        assert!(m.is_ignored(".DS_Store"));
        assert!(m.is_ignored("nested/dir/.DS_Store"));
        assert!(!m.is_ignored("src/main.rs"));
    }

    #[test]
    fn empty_setting_uses_default_patterns() {
        let m = IgnoreMatcher::load_with_home(&root(), Some("  "), None);
        assert_eq!(m.source(), &PatternSource::Default);
    }

    #[test]
    fn unreadable_file_uses_default_patterns() {
        let m = IgnoreMatcher::load_with_home(&root(), Some("/no/such/excludes"), None);
        assert_eq!(m.source(), &PatternSource::Default);
        assert!(m.is_ignored(".DS_Store"));
    }

    #[test]
    fn excludes_file_is_loaded_with_home_expansion() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(
            home.path().join(".gitignore_global"),
            "# editor files\r\n*.swp\r\n\r\nbuild/\n",
        )
        .unwrap();

        let m = IgnoreMatcher::load_with_home(&root(), Some("~/.gitignore_global"), Some(home.path()));
        assert_eq!(
            m.source(),
            &PatternSource::ExcludesFile(home.path().join(".gitignore_global"))
        );
        assert!(m.is_ignored("notes.swp"));
        assert!(m.is_ignored("src/.main.rs.swp"));
        assert!(m.is_ignored("build/out.o"));
        // Only the excludes file applies, not the built-in set.
        assert!(!m.is_ignored(".DS_Store"));
    }

    #[test]
    fn parse_skips_comments_and_blanks() {
        let patterns = parse_patterns("# c\n\n*.log\r\n  \ntarget\n");
        assert_eq!(patterns, vec!["*.log".to_string(), "target".to_string()]);
    }

    #[test]
    fn expand_home_variants() {
        let home = Path::new("/home/u");
        assert_eq!(expand_home("~", Some(home)).unwrap(), PathBuf::from("/home/u"));
        assert_eq!(
            expand_home("~/x/y", Some(home)).unwrap(),
            PathBuf::from("/home/u/x/y")
        );
        assert_eq!(expand_home("/etc/x", None).unwrap(), PathBuf::from("/etc/x"));
        assert!(matches!(expand_home("~/x", None), Err(IgnoreError::NoHomeDir(_))));
    }

    #[test]
    fn inline_patterns() {
        let m = IgnoreMatcher::from_patterns(&root(), ["*.tmp", "vendor/"]).unwrap();
        assert!(m.is_ignored("a.tmp"));
        assert!(m.is_ignored("vendor/lib/x.rs"));
        assert!(!m.is_ignored("src/vendor.rs"));
        assert!(!m.is_ignored(""));
    }
}
