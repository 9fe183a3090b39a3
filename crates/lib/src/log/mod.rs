//! Append-only log storage.
//!
//! This module provides the [`LogBackend`] trait, the storage substrate that
//! durably keeps every writer's sequence of nodes, and [`WriterLog`], the
//! per-writer view the store appends through.
//!
//! The store never rewrites a log: backends only have to support appending
//! the next seq of a writer and reading a writer's suffix back.

mod errors;
mod in_memory;

use async_trait::async_trait;

pub use errors::LogError;
pub use in_memory::InMemory;

use crate::Result;
use crate::node::{Node, Seq, WriterId};

/// Storage for the logs of every known writer.
///
/// Implementations must be `Send` and `Sync`; the store shares one backend
/// across tasks. Appends for a writer arrive strictly in seq order starting
/// at 0, and a backend must reject anything else with
/// [`LogError::NonSequentialAppend`] rather than leave a gap.
#[async_trait]
pub trait LogBackend: Send + Sync {
    /// Appends `node` to its writer's log.
    ///
    /// # Returns
    /// The seq the node was stored at (always `node.seq()`).
    async fn append(&self, node: Node) -> Result<Seq>;

    /// Reads a writer's nodes with seq strictly greater than `after`
    /// (`None` reads from the start), in seq order, at most `limit` of them.
    async fn entries_since(
        &self,
        writer: &WriterId,
        after: Option<Seq>,
        limit: Option<usize>,
    ) -> Result<Vec<Node>>;

    /// Highest seq stored for `writer`, or `None` for an unknown writer.
    async fn latest_seq(&self, writer: &WriterId) -> Result<Option<Seq>>;

    /// Every writer with at least one stored node.
    async fn writers(&self) -> Result<Vec<WriterId>>;
}

/// One writer's log, viewed through a backend.
pub struct WriterLog<'a> {
    backend: &'a dyn LogBackend,
    writer: WriterId,
}

impl<'a> WriterLog<'a> {
    pub fn new(backend: &'a dyn LogBackend, writer: WriterId) -> Self {
        Self { backend, writer }
    }

    pub fn writer(&self) -> &WriterId {
        &self.writer
    }

    /// Seq the next appended node must carry.
    pub async fn next_seq(&self) -> Result<Seq> {
        Ok(self.latest_seq().await?.map_or(0, |seq| seq + 1))
    }

    pub async fn latest_seq(&self) -> Result<Option<Seq>> {
        self.backend.latest_seq(&self.writer).await
    }

    /// Appends a node authored by this log's writer.
    pub async fn append(&self, node: Node) -> Result<Seq> {
        if *node.writer() != self.writer {
            return Err(LogError::StorageFailure {
                reason: format!(
                    "node {} does not belong to the log of {}",
                    node.id(),
                    self.writer
                ),
            }
            .into());
        }
        self.backend.append(node).await
    }

    pub async fn entries_since(&self, after: Option<Seq>, limit: Option<usize>) -> Result<Vec<Node>> {
        self.backend.entries_since(&self.writer, after, limit).await
    }

    /// The whole log, in seq order.
    pub async fn history(&self) -> Result<Vec<Node>> {
        self.entries_since(None, None).await
    }
}
