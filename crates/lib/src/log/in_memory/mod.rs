//! In-memory log backend
//!
//! This module provides an in-memory implementation of the LogBackend trait,
//! suitable for testing, development, or scenarios where durability is
//! handled externally by saving/loading the whole state to/from a file.

mod persistence;

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::log::{LogBackend, LogError};
use crate::node::{Node, Seq, WriterId};

/// A simple in-memory backend keeping one `Vec` per writer.
///
/// The index of a node in its writer's `Vec` is its seq, which is what makes
/// the gapless invariant cheap to enforce.
#[derive(Debug, Default)]
pub struct InMemory {
    /// Logs by writer, with read-write lock for concurrent access
    pub(crate) logs: RwLock<HashMap<WriterId, Vec<Node>>>,
}

impl InMemory {
    /// Creates a new, empty backend.
    pub fn new() -> Self {
        Self {
            logs: RwLock::new(HashMap::new()),
        }
    }

    /// Total number of nodes across all writers.
    pub async fn len(&self) -> usize {
        self.logs.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Saves every log to `path` as JSON.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads logs from a JSON file written by [`InMemory::save_to_file`].
    ///
    /// If the file does not exist, a new, empty backend is returned.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl LogBackend for InMemory {
    async fn append(&self, node: Node) -> Result<Seq> {
        let mut logs = self.logs.write().await;
        let log = logs.entry(node.writer().clone()).or_default();
        let expected = log.len() as Seq;
        if node.seq() != expected {
            return Err(LogError::NonSequentialAppend {
                writer: node.writer().clone(),
                expected,
                got: node.seq(),
            }
            .into());
        }
        let seq = node.seq();
        log.push(node);
        Ok(seq)
    }

    async fn entries_since(
        &self,
        writer: &WriterId,
        after: Option<Seq>,
        limit: Option<usize>,
    ) -> Result<Vec<Node>> {
        let logs = self.logs.read().await;
        let Some(log) = logs.get(writer) else {
            return Ok(Vec::new());
        };
        let start = after.map_or(0, |seq| seq.saturating_add(1));
        let start = usize::try_from(start).unwrap_or(usize::MAX).min(log.len());
        let nodes = log[start..].iter();
        Ok(match limit {
            Some(limit) => nodes.take(limit).cloned().collect(),
            None => nodes.cloned().collect(),
        })
    }

    async fn latest_seq(&self, writer: &WriterId) -> Result<Option<Seq>> {
        let logs = self.logs.read().await;
        Ok(logs
            .get(writer)
            .and_then(|log| log.len().checked_sub(1))
            .map(|last| last as Seq))
    }

    async fn writers(&self) -> Result<Vec<WriterId>> {
        let logs = self.logs.read().await;
        let mut writers: Vec<WriterId> = logs
            .iter()
            .filter(|(_, log)| !log.is_empty())
            .map(|(writer, _)| writer.clone())
            .collect();
        writers.sort();
        Ok(writers)
    }
}
