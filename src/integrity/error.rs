//! Integrity update error types.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that abort an integrity run.
///
/// A reference whose local file is missing is not an error: it is
/// logged as a warning and the tag is left untouched.
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("No <head> section found")]
    MissingHead,

    #[error("HTML parsing error: {0}")]
    Parse(String),

    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] io::Error),

    #[error("integrity check failed for {count} tag(s)")]
    Mismatch { count: usize },
}

impl IntegrityError {
    /// Wrap an IO error with the path it occurred on.
    pub fn io(path: &Path, err: io::Error) -> Self {
        Self::Io(path.to_path_buf(), err)
    }

    /// Whether this error is a problem with the document or its assets
    /// rather than the filesystem.
    pub const fn is_reportable(&self) -> bool {
        matches!(self, Self::MissingHead | Self::Mismatch { .. })
    }

    /// Whether the process should exit non-zero after reporting this error.
    ///
    /// A document without a head aborts the run but is not a failure.
    pub const fn fails_run(&self) -> bool {
        !matches!(self, Self::MissingHead)
    }
}
