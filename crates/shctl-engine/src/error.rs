//! Error types for the mutation engine.
//!
//! Validator rejections surface from the staging layer as
//! [`TransactionOutcome::Rejected`](crate::TransactionOutcome::Rejected) and
//! are turned into [`EngineError::Validation`] by the engine, so callers of
//! the public operations only ever see this enum.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad classification used by callers to pick messages and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Open, read, write, rename, copy, or spawn failure.
    Io,
    /// The external validator rejected the candidate content.
    Validation,
    /// No backup snapshot matched the target.
    NotFound,
    /// An entry could not be represented as a single line.
    InvalidEntry,
}

/// Errors surfaced by the mutation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A filesystem or process operation failed.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        /// Short verb phrase describing the failed step.
        operation: &'static str,
        /// Path the operation targeted.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing listing output to the caller's sink failed.
    #[error("failed to write listing output: {0}")]
    Output(#[source] io::Error),

    /// The validator rejected the candidate; the live file was not modified.
    #[error("validation rejected the change to {target}: {diagnostic}")]
    Validation {
        /// Live file the change was aimed at.
        target: PathBuf,
        /// Validator diagnostic text, verbatim.
        diagnostic: String,
    },

    /// No snapshot of the target exists in the backup directory.
    #[error("no {target} backup found in {dir}")]
    NoBackupFound {
        /// Backup directory that was searched.
        dir: PathBuf,
        /// Base name of the target whose snapshots were sought.
        target: String,
    },

    /// An entry field contains a line break.
    #[error("entry must fit on a single line: {entry:?}")]
    InvalidEntry {
        /// Offending field value.
        entry: String,
    },
}

impl EngineError {
    /// Creates an I/O error for `operation` on `path`.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::Output(_) => ErrorKind::Io,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NoBackupFound { .. } => ErrorKind::NotFound,
            Self::InvalidEntry { .. } => ErrorKind::InvalidEntry,
        }
    }
}
