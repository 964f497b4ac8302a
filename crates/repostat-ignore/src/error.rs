//! Error types for the ignore crate.

use std::path::PathBuf;

/// Errors that can occur while loading exclusion patterns.
#[derive(Debug, thiserror::Error)]
pub enum IgnoreError {
    /// The excludes file could not be read.
    #[error("cannot read excludes file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `~` path was configured but no home directory is known.
    #[error("cannot expand '{0}': home directory unknown")]
    NoHomeDir(String),

    /// The compiled pattern set could not be built.
    #[error("invalid pattern set: {0}")]
    Build(#[from] ignore::Error),
}
