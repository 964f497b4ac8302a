//! Exclusion patterns for repostat.
//!
//! Loads the user's global excludes file (git's `core.excludesFile`) and
//! compiles it into a matcher for repository-relative slash paths. When no
//! excludes file is configured or it cannot be read, a built-in pattern set
//! excluding OS metadata files is used instead.

pub mod error;
pub mod matcher;

pub use error::IgnoreError;
pub use matcher::{expand_home, parse_patterns, IgnoreMatcher, PatternSource, DEFAULT_PATTERNS};
