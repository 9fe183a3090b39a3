//! Hierarchical keys.
//!
//! Keys are `/`-separated paths. Surrounding separators are ignored, so
//! `"/foo/bar/"` and `"foo/bar"` name the same key. The root scope is not a
//! key: it is only reachable as a [`Prefix`].

mod errors;

use std::cmp::Ordering;
use std::fmt;

pub use errors::KeyError;

/// Segment separator.
pub const SEPARATOR: char = '/';

/// A validated, normalized key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Validates and normalizes `raw`.
    ///
    /// # Errors
    /// [`KeyError`] if the key is empty, has an empty segment or contains NUL.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let normalized = normalize(raw)?;
        if normalized.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(normalized.to_string()))
    }

    /// Validates a key read back from a node, which must already be in
    /// normalized form.
    ///
    /// # Errors
    /// Anything [`Key::parse`] rejects, and [`KeyError::NotNormalized`] when
    /// `raw` would only be accepted after normalization.
    pub fn parse_stored(raw: &str) -> Result<Self, KeyError> {
        let key = Self::parse(raw)?;
        if key.0 != raw {
            return Err(KeyError::NotNormalized {
                key: raw.to_string(),
            });
        }
        Ok(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> std::str::Split<'_, char> {
        self.0.split(SEPARATOR)
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated iteration scope. The empty prefix is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Prefix(String);

impl Prefix {
    /// The root scope.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Validates and normalizes `raw`. `""` and `"/"` both yield the root.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        Ok(Self(normalize(raw)?.to_string()))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segments of the scope; empty for the root.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }
}

impl From<Key> for Prefix {
    fn from(key: Key) -> Self {
        Self(key.0)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Orders two normalized keys segment by segment, the order the trie walks in.
///
/// A key sorts before all keys beneath it.
pub fn cmp_segments(a: &str, b: &str) -> Ordering {
    a.split(SEPARATOR).cmp(b.split(SEPARATOR))
}

fn normalize(raw: &str) -> Result<&str, KeyError> {
    let trimmed = raw.trim_matches(SEPARATOR);
    if trimmed.contains('\0') {
        return Err(KeyError::NulByte {
            key: raw.to_string(),
        });
    }
    if !trimmed.is_empty() && trimmed.split(SEPARATOR).any(str::is_empty) {
        return Err(KeyError::EmptySegment {
            key: raw.to_string(),
        });
    }
    Ok(trimmed)
}
