//! Per-key head tracking.
//!
//! The [`CausalIndex`] keeps, for every key, the set of nodes no other known
//! node for that key has observed (the heads). Insertion only ever compares
//! clocks, so the cost of placing a node is O(heads × writers) and does not
//! depend on history length.
//!
//! Insertion is order-independent: clocks are transitively closed, so a node
//! dominated by some earlier, already-superseded head is also dominated by
//! whichever head superseded it. Any delivery order of the same node set ends
//! in the same head sets.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::node::{Clock, Node, NodeId};

/// The causally maximal nodes of one key.
///
/// Always non-empty, never contains two nodes where one dominates the other,
/// and kept sorted by writer id then seq so conflict sets present the same
/// way on every replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadSet {
    nodes: Vec<Arc<Node>>,
}

impl HeadSet {
    fn single(node: Arc<Node>) -> Self {
        Self { nodes: vec![node] }
    }

    /// The key these heads belong to.
    pub fn key(&self) -> &str {
        self.nodes[0].key()
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false for a head set held by the index.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// More than one head: concurrent writes nobody has reconciled.
    pub fn is_conflicted(&self) -> bool {
        self.nodes.len() > 1
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes
            .iter()
            .any(|n| n.seq() == id.seq && *n.writer() == id.writer)
    }
}

/// What happened to a node handed to [`CausalIndex::insert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The node is now a head. `superseded` lists the heads it replaced.
    Added {
        heads: Arc<HeadSet>,
        superseded: Vec<Arc<Node>>,
    },
    /// A current head has already observed the node.
    Stale,
    /// The node is already a head.
    Duplicate,
}

impl InsertOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, InsertOutcome::Added { .. })
    }
}

/// Heads per key plus the frontier clock of everything inserted.
#[derive(Debug, Default)]
pub struct CausalIndex {
    heads: HashMap<String, Arc<HeadSet>>,
    frontier: Clock,
}

impl CausalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `node` among the heads of its key.
    pub fn insert(&mut self, node: Arc<Node>) -> InsertOutcome {
        self.frontier.merge(node.clock());
        self.frontier.observe(node.writer(), node.seq());

        let Some(current) = self.heads.get(node.key()) else {
            let heads = Arc::new(HeadSet::single(node.clone()));
            self.heads.insert(node.key().to_string(), heads.clone());
            trace!(key = node.key(), node = %node.id(), "First head for key");
            return InsertOutcome::Added {
                heads,
                superseded: Vec::new(),
            };
        };

        if current.nodes.iter().any(|head| head.is_same(&node)) {
            return InsertOutcome::Duplicate;
        }
        if current.nodes.iter().any(|head| head.dominates(&node)) {
            trace!(key = node.key(), node = %node.id(), "Node already superseded");
            return InsertOutcome::Stale;
        }

        let (superseded, mut kept): (Vec<_>, Vec<_>) = current
            .nodes
            .iter()
            .cloned()
            .partition(|head| node.dominates(head));
        let position = kept
            .binary_search_by(|head| head.tie_break(&node))
            .unwrap_or_else(|pos| pos);
        kept.insert(position, node.clone());

        let heads = Arc::new(HeadSet { nodes: kept });
        trace!(
            key = node.key(),
            node = %node.id(),
            superseded = superseded.len(),
            heads = heads.len(),
            "Updated heads"
        );
        self.heads.insert(node.key().to_string(), heads.clone());
        InsertOutcome::Added { heads, superseded }
    }

    /// Current heads of `key`.
    pub fn heads(&self, key: &str) -> Option<Arc<HeadSet>> {
        self.heads.get(key).cloned()
    }

    pub fn is_conflicted(&self, key: &str) -> bool {
        self.heads.get(key).is_some_and(|h| h.is_conflicted())
    }

    /// Keys with more than one head, sorted.
    pub fn conflicted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .heads
            .iter()
            .filter(|(_, heads)| heads.is_conflicted())
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Per-writer high-water mark of everything inserted, including what the
    /// inserted nodes had themselves observed.
    pub fn frontier(&self) -> &Clock {
        &self.frontier
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }
}
