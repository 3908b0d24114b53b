//! Error types shared by the organizer, mover, history and undo code.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while organizing a directory or undoing a run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The target directory does not exist or is not a directory.
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// The destination directory handed to the mover is missing.
    #[error("destination directory does not exist: {}", path.display())]
    DestinationNotFound { path: PathBuf },

    /// The file handed to the mover is not an existing regular file.
    #[error("source is not a regular file: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read directory {}: {source}", path.display())]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write history file: {source}")]
    HistoryWriteFailed {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read history file: {source}")]
    HistoryReadFailed {
        #[source]
        source: std::io::Error,
    },

    #[error("invalid history file: {reason}")]
    InvalidHistory { reason: String },

    /// Undo was requested but no run has been recorded for the directory.
    #[error("no previous organization found in {}", path.display())]
    NoHistory { path: PathBuf },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for organizer operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;
