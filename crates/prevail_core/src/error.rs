//! Error types for Prevail core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Prevail core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Artifact storage error.
    #[error("storage error: {0}")]
    Storage(#[from] prevail_storage::StorageError),

    /// Snapshot codec error.
    #[error("codec error: {0}")]
    Codec(#[from] prevail_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A snapshot names a record type that was never registered.
    #[error("unknown record type: {identity}")]
    UnknownRecordType {
        /// Display form of the unregistered type identity.
        identity: String,
    },

    /// Invalid snapshot contents.
    #[error("invalid snapshot format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// Another handle holds the store's lock file.
    #[error("database locked: another process has exclusive access")]
    DatabaseLocked,
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates an unknown record type error.
    pub fn unknown_record_type(identity: impl ToString) -> Self {
        Self::UnknownRecordType {
            identity: identity.to_string(),
        }
    }
}
