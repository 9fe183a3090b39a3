//! Store-level error types.

use thiserror::Error;

/// Errors raised by the [`Store`](super::Store) itself.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The iterator was about to emit a key twice (or out of order).
    ///
    /// This is an internal invariant violation: the index is corrupt and the
    /// store should not be trusted further.
    #[error("Iterator invariant violated: key {key:?} emitted twice or out of order")]
    DuplicateKey {
        /// The key that broke the ordering
        key: String,
    },

    /// Configuration was rejected.
    #[error("Invalid store configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration is unusable
        reason: String,
    },
}

impl StoreError {
    /// Check if this error indicates internal corruption rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        matches!(self, StoreError::InvalidConfig { .. })
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
