//! Error types for storage operations.

use crate::backend::Artifact;
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Writing the staged copy of an artifact failed.
    #[error("failed to stage {artifact} artifact: {source}")]
    Stage {
        /// Artifact being staged.
        artifact: Artifact,
        /// Underlying error.
        source: io::Error,
    },

    /// Replacing the live artifact with its staged copy failed.
    #[error("failed to publish {artifact} artifact: {source}")]
    Publish {
        /// Artifact being published.
        artifact: Artifact,
        /// Underlying error.
        source: io::Error,
    },

    /// Publish was requested but nothing is staged.
    #[error("no staged {0} artifact to publish")]
    NothingStaged(Artifact),
}
