//!
//! Defines the immutable write record (`Node`) and its causal metadata.
//!
//! A `Node` is one write of one key by one writer. Its position in the
//! writer's log is its `seq`; its [`Clock`] records what the writer had
//! observed from every other writer when the write was made. Because every
//! clock a store hands out is its full frontier (see `CausalIndex`), comparing
//! two clocks directly answers the transitive "has seen" question.

pub mod clock;
pub mod writer;

use std::cmp::Ordering;
use std::fmt;

pub use clock::Clock;
use serde::{Deserialize, Serialize};
pub use writer::WriterId;

/// Position of a node within its writer's log. Starts at 0 and is gapless.
pub type Seq = u64;

/// Identity of a node: its writer and position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    pub writer: WriterId,
    pub seq: Seq,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.writer, self.seq)
    }
}

/// Causal relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CausalOrder {
    /// Same node.
    Equal,
    /// `self` was observed by `other`.
    Before,
    /// `self` has observed `other`.
    After,
    /// Neither has observed the other.
    Concurrent,
}

/// One immutable write.
///
/// # Example
///
/// ```
/// use polylog::node::{Clock, Node, WriterId};
///
/// let a = WriterId::from("a");
/// let first = Node::new("k", b"v1".to_vec(), a.clone(), 0, Clock::new());
/// let second = Node::new("k", b"v2".to_vec(), a, 1, Clock::new());
/// assert!(second.dominates(&first));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    key: String,
    #[serde(with = "serde_bytes")]
    value: Vec<u8>,
    writer: WriterId,
    seq: Seq,
    #[serde(default)]
    clock: Clock,
}

impl Node {
    /// Creates a node. The writer's own entry is stripped from `clock`: a node
    /// never references its own writer's positions, past or future.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
        writer: WriterId,
        seq: Seq,
        mut clock: Clock,
    ) -> Self {
        clock.remove(&writer);
        Self {
            key: key.into(),
            value: value.into(),
            writer,
            seq,
            clock,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn writer(&self) -> &WriterId {
        &self.writer
    }

    pub fn seq(&self) -> Seq {
        self.seq
    }

    /// Positions observed from other writers when this node was written.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn id(&self) -> NodeId {
        NodeId {
            writer: self.writer.clone(),
            seq: self.seq,
        }
    }

    /// Returns true if `writer`'s node at `seq` is this node or was observed by it.
    pub fn has_seen(&self, writer: &WriterId, seq: Seq) -> bool {
        if *writer == self.writer {
            seq <= self.seq
        } else {
            self.clock.covers(writer, seq)
        }
    }

    /// Returns true if this node causally supersedes `other`.
    pub fn dominates(&self, other: &Node) -> bool {
        !self.is_same(other) && self.has_seen(&other.writer, other.seq)
    }

    /// Returns true if both refer to the same log position.
    pub fn is_same(&self, other: &Node) -> bool {
        self.seq == other.seq && self.writer == other.writer
    }

    /// Compares two nodes by causality alone.
    pub fn causal_order(&self, other: &Node) -> CausalOrder {
        if self.is_same(other) {
            CausalOrder::Equal
        } else if self.dominates(other) {
            CausalOrder::After
        } else if other.dominates(self) {
            CausalOrder::Before
        } else {
            CausalOrder::Concurrent
        }
    }

    /// Deterministic presentation order: writer id, then seq.
    pub fn tie_break(&self, other: &Node) -> Ordering {
        self.writer
            .cmp(&other.writer)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}
