use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`DocumentStore`](super::DocumentStore) implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Stored document exists but cannot be decoded.
    #[error("corrupt document at {path}: {reason}")]
    Corrupt {
        /// Document path.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// Another writer committed first; reload and retry.
    #[error("version conflict: expected {expected:?}, found {found:?}")]
    VersionConflict {
        /// Version the writer read.
        expected: Option<u64>,
        /// Version currently stored.
        found: Option<u64>,
    },

    /// Gave up after repeated conflicts.
    #[error("update abandoned after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: usize,
    },
}

impl StoreError {
    /// Returns `true` if the stored document exists but is unreadable.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}

/// Convenience result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;
