//! Error taxonomy for the resolution pipeline
//!
//! Only `LoadError` (and the strict-mode unresolved limit) abort a run;
//! everything else degrades to "this one citation is unresolved" so a bad
//! citation never blocks resolution of the rest.

use thiserror::Error;

/// Fatal errors from the bibliography source loader
///
/// A load failure aborts the whole run before any matching occurs: every
/// match result would otherwise be built on an incomplete index.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read bibliography source {path}: {message}")]
    Io { path: String, message: String },
    #[error("Malformed {format} source: {message}")]
    Malformed {
        format: &'static str,
        message: String,
    },
    #[error("Bibliography source is empty")]
    EmptySource,
    #[error("No bibliographic records parsed from a non-empty source")]
    NoEntries,
}

/// Per-citation failures inside the auto-add resolver
///
/// All recoverable: the citation falls back to unresolved and the failure
/// is recorded in the audit log.
#[derive(Error, Debug)]
pub enum AutoAddError {
    #[error("Translation failed: {message}")]
    Translation { message: String },
    #[error("Candidate entry rejected by validation")]
    ValidationRejected,
    #[error("Write-back failed: {message}")]
    Persist { message: String },
    #[error("Auto-add attempt cap exhausted")]
    ThresholdExceeded,
}

/// Run-level errors
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{count} citations unresolved, exceeding the strict-mode limit of {limit}")]
    TooManyUnresolved { count: usize, limit: usize },
}
