//! Key validation errors.

use thiserror::Error;

/// Reasons a key or prefix is rejected before any mutation happens.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key has no segments once surrounding separators are removed.
    #[error("Key is empty")]
    Empty,

    /// Two separators with nothing between them.
    #[error("Key {key:?} contains an empty path segment")]
    EmptySegment {
        /// The offending key as given
        key: String,
    },

    /// NUL is reserved and never valid inside a segment.
    #[error("Key {key:?} contains a NUL byte")]
    NulByte {
        /// The offending key as given
        key: String,
    },

    /// A stored key that is not in normalized form, e.g. with surrounding separators.
    #[error("Stored key {key:?} is not normalized")]
    NotNormalized {
        /// The offending key as stored
        key: String,
    },
}

impl KeyError {
    /// Get the rejected key, when there was one.
    pub fn key(&self) -> Option<&str> {
        match self {
            KeyError::Empty => None,
            KeyError::EmptySegment { key }
            | KeyError::NulByte { key }
            | KeyError::NotNormalized { key } => Some(key),
        }
    }
}

impl From<KeyError> for crate::Error {
    fn from(err: KeyError) -> Self {
        crate::Error::Key(err)
    }
}
