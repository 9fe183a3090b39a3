//! Log storage error types.
//!
//! Every variant here is a storage failure from the point of view of the
//! operation that triggered it: fatal to that call, never applied to the
//! in-memory index, and safe to retry.

use thiserror::Error;

use crate::node::{Seq, WriterId};

/// Errors raised by a [`LogBackend`](super::LogBackend).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LogError {
    /// The backing store could not complete the operation.
    #[error("Storage failure: {reason}")]
    StorageFailure {
        /// Description of the failure
        reason: String,
    },

    /// An append did not continue the writer's log exactly.
    #[error("Non-sequential append to {writer}: expected seq {expected}, got {got}")]
    NonSequentialAppend {
        /// The writer whose log was appended to
        writer: WriterId,
        /// The only seq that would have been accepted
        expected: Seq,
        /// The seq that was offered
        got: Seq,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl LogError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            LogError::FileIo { .. }
                | LogError::SerializationFailed { .. }
                | LogError::DeserializationFailed { .. }
        )
    }

    /// Check if the append was rejected for breaking the gapless invariant.
    pub fn is_sequence_error(&self) -> bool {
        matches!(self, LogError::NonSequentialAppend { .. })
    }

    /// Get the writer if this error is about a specific log.
    pub fn writer(&self) -> Option<&WriterId> {
        match self {
            LogError::NonSequentialAppend { writer, .. } => Some(writer),
            _ => None,
        }
    }
}

impl From<LogError> for crate::Error {
    fn from(err: LogError) -> Self {
        crate::Error::Log(err)
    }
}
