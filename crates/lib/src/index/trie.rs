//! Path-segment trie over the key space.
//!
//! Each trie node maps child segments to child nodes and, if a key ends
//! there, holds that key's [`HeadSet`]. The head set is the same allocation
//! the [`CausalIndex`](super::CausalIndex) owns; the trie only navigates.
//!
//! Nodes are shared through `Arc` and updated copy-on-write, so a snapshot of
//! the root is O(1) and stays valid while later writes proceed.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::sync::Arc;

use super::causal::HeadSet;
use crate::key::{Key, Prefix};

/// One node of the trie.
#[derive(Debug, Clone, Default)]
pub struct TrieNode {
    children: BTreeMap<String, Arc<TrieNode>>,
    heads: Option<Arc<HeadSet>>,
}

impl TrieNode {
    /// Heads of the key ending at this node, if one does.
    pub fn heads(&self) -> Option<&Arc<HeadSet>> {
        self.heads.as_ref()
    }

    pub fn child(&self, segment: &str) -> Option<&Arc<TrieNode>> {
        self.children.get(segment)
    }

    /// Children in segment order.
    pub fn children(&self) -> btree_map::Iter<'_, String, Arc<TrieNode>> {
        self.children.iter()
    }

    pub(crate) fn children_map(&self) -> &BTreeMap<String, Arc<TrieNode>> {
        &self.children
    }

    pub fn is_terminal(&self) -> bool {
        self.heads.is_some()
    }

    /// Heads of the first key at or below this node, in iteration order.
    ///
    /// Nodes are never pruned, so every leaf is terminal and the leftmost
    /// descent always finds a key.
    pub fn first_heads(&self) -> Option<&Arc<HeadSet>> {
        let mut node = self;
        loop {
            if let Some(heads) = &node.heads {
                return Some(heads);
            }
            node = node.children.values().next()?.as_ref();
        }
    }
}

/// The key-space index of one store.
#[derive(Debug, Clone, Default)]
pub struct Trie {
    root: Arc<TrieNode>,
    keys: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `key` at `heads`, creating intermediate nodes as needed.
    pub fn put(&mut self, key: &Key, heads: Arc<HeadSet>) {
        let mut node = Arc::make_mut(&mut self.root);
        for segment in key.segments() {
            node = Arc::make_mut(node.children.entry(segment.to_string()).or_default());
        }
        if node.heads.replace(heads).is_none() {
            self.keys += 1;
        }
    }

    /// Exact lookup, O(depth of key).
    pub fn get(&self, key: &Key) -> Option<Arc<HeadSet>> {
        let mut node = &self.root;
        for segment in key.segments() {
            node = node.children.get(segment)?;
        }
        node.heads.clone()
    }

    /// Subtree rooted at `prefix`, or `None` if nothing was ever written there.
    pub fn scope(&self, prefix: &Prefix) -> Option<Arc<TrieNode>> {
        let mut node = &self.root;
        for segment in prefix.segments() {
            node = node.children.get(segment)?;
        }
        Some(node.clone())
    }

    /// O(1) snapshot of the whole trie.
    pub fn snapshot(&self) -> Arc<TrieNode> {
        self.root.clone()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys == 0
    }
}
