//! Prefix-scoped iteration over a store.
//!
//! An [`Iter`] walks a snapshot of the trie taken when it was created, one
//! key per step. It never materializes the result: the cursor is a stack of
//! `(trie node, last child visited)` frames, and the next child is found with
//! a range query on the node's ordered children. Dropping the iterator is all
//! the cleanup it needs.
//!
//! Keys come out depth-first with siblings in segment order and every key
//! before the keys beneath it, so they are strictly increasing under
//! [`cmp_segments`]. The iterator checks that on every step; a repeat would
//! mean the index is corrupt.

use std::cmp::Ordering;
use std::ops::Bound;
use std::sync::Arc;

use tracing::error;

use crate::Result;
use crate::index::{HeadSet, TrieNode};
use crate::key::{Prefix, cmp_segments};
use crate::node::Node;
use crate::store::StoreError;

/// What a key currently holds: one value, or a fork.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A single head.
    Value(Arc<Node>),
    /// Concurrent heads, sorted by writer id then seq. Never empty when
    /// produced by an iterator.
    Conflict(Vec<Arc<Node>>),
}

impl Entry {
    /// The key the heads were written under; empty for a hand-built empty conflict.
    pub fn key(&self) -> &str {
        match self {
            Entry::Value(node) => node.key(),
            Entry::Conflict(nodes) => nodes.first().map_or("", |n| n.key()),
        }
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        match self {
            Entry::Value(node) => std::slice::from_ref(node),
            Entry::Conflict(nodes) => nodes,
        }
    }

    /// Every head value, in head order.
    pub fn values(&self) -> Vec<&[u8]> {
        self.nodes().iter().map(|n| n.value()).collect()
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Entry::Conflict(_))
    }

    /// The value, if the key is not forked.
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            Entry::Value(node) => Some(node.value()),
            Entry::Conflict(_) => None,
        }
    }
}

impl From<&HeadSet> for Entry {
    fn from(heads: &HeadSet) -> Self {
        match heads.nodes() {
            [single] => Entry::Value(single.clone()),
            nodes => Entry::Conflict(nodes.to_vec()),
        }
    }
}

/// Scope and mode of an iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterOptions {
    pub prefix: Option<String>,
    pub recursive: bool,
}

impl Default for IterOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            recursive: true,
        }
    }
}

impl IterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts iteration to keys at or below `prefix`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// `false` yields one entry per immediate child of the scope.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub(crate) fn parsed_prefix(&self) -> Result<Prefix> {
        match &self.prefix {
            Some(raw) => Ok(Prefix::parse(raw)?),
            None => Ok(Prefix::root()),
        }
    }
}

#[derive(Debug)]
struct Frame {
    node: Arc<TrieNode>,
    /// Segment of the last child pushed; `None` before the first.
    after: Option<String>,
    /// Whether this node's own key has been considered.
    visited: bool,
}

impl Frame {
    fn new(node: Arc<TrieNode>) -> Self {
        Self {
            node,
            after: None,
            visited: false,
        }
    }

    fn next_child(&mut self) -> Option<Arc<TrieNode>> {
        let children = self.node.children_map();
        let next = match &self.after {
            None => children.iter().next(),
            Some(after) => children
                .range::<str, _>((Bound::Excluded(after.as_str()), Bound::Unbounded))
                .next(),
        };
        let (segment, child) = next?;
        let child = child.clone();
        self.after = Some(segment.clone());
        Some(child)
    }
}

/// Lazy, one-shot iterator over `(key, value-or-conflict)` entries.
///
/// Yields `Result<Entry>`; after an error it yields nothing more.
#[derive(Debug)]
pub struct Iter {
    stack: Vec<Frame>,
    recursive: bool,
    last_key: Option<String>,
}

impl Iter {
    /// Iterates the subtree `scope`. The scope's own key is included when
    /// recursive and never when listing children.
    pub(crate) fn new(scope: Option<Arc<TrieNode>>, recursive: bool) -> Self {
        let stack = match scope {
            Some(node) => {
                let mut frame = Frame::new(node);
                frame.visited = !recursive;
                vec![frame]
            }
            None => Vec::new(),
        };
        Self {
            stack,
            recursive,
            last_key: None,
        }
    }

    /// An iterator that yields nothing.
    pub fn empty() -> Self {
        Self::new(None, true)
    }

    fn next_recursive(&mut self) -> Option<Arc<HeadSet>> {
        loop {
            let frame = self.stack.last_mut()?;
            if !frame.visited {
                frame.visited = true;
                if let Some(heads) = frame.node.heads() {
                    return Some(heads.clone());
                }
                continue;
            }
            match frame.next_child() {
                Some(child) => self.stack.push(Frame::new(child)),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn next_child_entry(&mut self) -> Option<Arc<HeadSet>> {
        let scope = self.stack.last_mut()?;
        loop {
            let Some(child) = scope.next_child() else {
                self.stack.clear();
                return None;
            };
            if let Some(heads) = child.first_heads() {
                return Some(heads.clone());
            }
        }
    }

    fn emit(&mut self, heads: Arc<HeadSet>) -> Result<Entry> {
        let key = heads.key();
        if let Some(last) = &self.last_key {
            if cmp_segments(last, key) != Ordering::Less {
                error!(key, previous = %last, "Iterator emitted keys out of order");
                self.stack.clear();
                return Err(StoreError::DuplicateKey {
                    key: key.to_string(),
                }
                .into());
            }
        }
        self.last_key = Some(key.to_string());
        Ok(Entry::from(heads.as_ref()))
    }
}

impl Iterator for Iter {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let heads = if self.recursive {
            self.next_recursive()?
        } else {
            self.next_child_entry()?
        };
        Some(self.emit(heads))
    }
}
