//! Causal clocks.
//!
//! A [`Clock`] records, per writer, the highest sequence number observed.
//! Merging is a pointwise max and comparison is O(number of writers).

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use super::{Seq, WriterId};

/// Per-writer high-water marks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clock(BTreeMap<WriterId, Seq>);

impl Clock {
    /// Creates an empty clock.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Highest seq observed for `writer`, if any.
    pub fn get(&self, writer: &WriterId) -> Option<Seq> {
        self.0.get(writer).copied()
    }

    /// Records that `writer` has been observed up to `seq`. Never moves backwards.
    pub fn observe(&mut self, writer: &WriterId, seq: Seq) {
        match self.0.get_mut(writer) {
            Some(current) => *current = (*current).max(seq),
            None => {
                self.0.insert(writer.clone(), seq);
            }
        }
    }

    /// Pointwise max with `other`.
    pub fn merge(&mut self, other: &Clock) {
        for (writer, seq) in &other.0 {
            self.observe(writer, *seq);
        }
    }

    /// Returns true if `seq` of `writer` is covered by this clock.
    pub fn covers(&self, writer: &WriterId, seq: Seq) -> bool {
        self.get(writer).is_some_and(|seen| seen >= seq)
    }

    /// Removes and returns the entry for `writer`.
    pub fn remove(&mut self, writer: &WriterId) -> Option<Seq> {
        self.0.remove(writer)
    }

    /// Number of writers in the clock.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no writer has been observed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(writer, seq)` pairs in writer order.
    pub fn iter(&self) -> btree_map::Iter<'_, WriterId, Seq> {
        self.0.iter()
    }
}

impl FromIterator<(WriterId, Seq)> for Clock {
    fn from_iter<T: IntoIterator<Item = (WriterId, Seq)>>(iter: T) -> Self {
        let mut clock = Clock::new();
        for (writer, seq) in iter {
            clock.observe(&writer, seq);
        }
        clock
    }
}

impl<'a> IntoIterator for &'a Clock {
    type Item = (&'a WriterId, &'a Seq);
    type IntoIter = btree_map::Iter<'a, WriterId, Seq>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Clock> for BTreeMap<WriterId, Seq> {
    fn from(clock: Clock) -> Self {
        clock.0
    }
}

impl From<BTreeMap<WriterId, Seq>> for Clock {
    fn from(map: BTreeMap<WriterId, Seq>) -> Self {
        Self(map)
    }
}
