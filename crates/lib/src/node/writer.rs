//! Writer identity.
//!
//! A `WriterId` names one independent append-only log. Generated ids are
//! 32 random bytes, hex-encoded.

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of random bytes in a generated writer id.
const WRITER_ID_BYTES: usize = 32;

/// Identifier of a writer (one append-only log).
///
/// Ids are ordered lexicographically; that order is the tie-break used when a
/// conflict set has to be presented deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WriterId(String);

impl WriterId {
    /// Creates a writer id from any string-like input.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generates a fresh random writer id.
    pub fn generate() -> Self {
        let mut bytes = [0u8; WRITER_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the id is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for WriterId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WriterId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&WriterId> for WriterId {
    fn from(id: &WriterId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for WriterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WriterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0)
    }
}

impl PartialEq<str> for WriterId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WriterId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// Serialized as a bare string
impl Serialize for WriterId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WriterId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(WriterId(s))
    }
}
