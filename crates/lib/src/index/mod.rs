//! In-memory index of a store: heads per key plus the trie over key space.
//!
//! [`Index::insert`] is the single insertion path for both local writes and
//! replicated nodes, so the trie and the causal index can never disagree.

pub mod causal;
pub mod trie;

use std::sync::Arc;

pub use causal::{CausalIndex, HeadSet, InsertOutcome};
pub use trie::{Trie, TrieNode};

use crate::key::{Key, Prefix};
use crate::node::{Clock, Node};

/// One `CausalIndex`/`Trie` pair.
#[derive(Debug, Default)]
pub struct Index {
    causal: CausalIndex,
    trie: Trie,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node whose key has already been validated as `key`.
    pub fn insert(&mut self, key: &Key, node: Arc<Node>) -> InsertOutcome {
        debug_assert_eq!(key.as_str(), node.key());
        let outcome = self.causal.insert(node);
        if let InsertOutcome::Added { heads, .. } = &outcome {
            self.trie.put(key, heads.clone());
        }
        outcome
    }

    pub fn heads(&self, key: &Key) -> Option<Arc<HeadSet>> {
        self.trie.get(key)
    }

    pub fn scope(&self, prefix: &Prefix) -> Option<Arc<TrieNode>> {
        self.trie.scope(prefix)
    }

    pub fn frontier(&self) -> &Clock {
        self.causal.frontier()
    }

    pub fn causal(&self) -> &CausalIndex {
        &self.causal
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}
