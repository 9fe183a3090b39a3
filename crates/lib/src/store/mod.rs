//!
//! Provides the main store structure (`Store`).
//!
//! A `Store` is one replica: it owns a local writer, the backend holding the
//! logs of every writer it knows, and the in-memory [`Index`] built from
//! those logs. Local writes and replicated nodes go through the same
//! append-then-index path.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{
    Result,
    index::{Index, InsertOutcome},
    iter::{Entry, Iter, IterOptions},
    key::Key,
    log::{InMemory, LogBackend, WriterLog},
    node::{Clock, Node, Seq, WriterId},
    replication::ReplicationError,
};

mod config;
mod errors;

pub use config::{DEFAULT_BATCH_SIZE, StoreConfig};
pub use errors::StoreError;

/// Highest seq held per writer.
pub type Cursors = BTreeMap<WriterId, Seq>;

/// Indicates whether a node entered the store from a local write or from a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteSource {
    Local,
    Remote,
}

impl std::fmt::Display for WriteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteSource::Local => f.write_str("local"),
            WriteSource::Remote => f.write_str("remote"),
        }
    }
}

struct StoreInner {
    writer: WriterId,
    backend: Arc<dyn LogBackend>,
    /// Held for writing across "append to log, then index", which serializes
    /// writes and keeps a failed append from touching the index.
    index: RwLock<Index>,
    config: StoreConfig,
}

/// One replica of the key-value store.
///
/// Cloning is cheap and yields another handle to the same replica.
///
/// # Example
///
/// ```
/// # #[tokio::main]
/// # async fn main() -> polylog::Result<()> {
/// use polylog::{IterOptions, Store};
///
/// let store = Store::in_memory().await?;
/// store.put("docs/readme", b"hello".to_vec()).await?;
/// store.put("docs/todo", b"write more".to_vec()).await?;
///
/// let keys: Vec<String> = store
///     .iter(IterOptions::new().prefix("docs"))
///     .await?
///     .map(|entry| entry.map(|e| e.key().to_string()))
///     .collect::<polylog::Result<_>>()?;
/// assert_eq!(keys, ["docs/readme", "docs/todo"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("writer", &self.inner.writer)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Opens a store over `backend`, rebuilding the index from every log it
    /// already holds.
    pub async fn open(backend: Arc<dyn LogBackend>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let writer = config.writer.clone().unwrap_or_else(WriterId::generate);

        let mut index = Index::new();
        let mut replayed = 0usize;
        for log_writer in backend.writers().await? {
            let log = WriterLog::new(backend.as_ref(), log_writer);
            let mut after = None;
            loop {
                let batch = log.entries_since(after, Some(config.batch_size)).await?;
                let Some(last) = batch.last() else { break };
                after = Some(last.seq());
                for node in batch {
                    let key = Key::parse_stored(node.key())?;
                    index.insert(&key, Arc::new(node));
                    replayed += 1;
                }
            }
        }
        info!(writer = %writer, replayed, keys = index.len(), "Opened store");

        Ok(Self {
            inner: Arc::new(StoreInner {
                writer,
                backend,
                index: RwLock::new(index),
                config,
            }),
        })
    }

    /// A fresh store over an empty [`InMemory`] backend with a random writer.
    pub async fn in_memory() -> Result<Self> {
        Self::open(Arc::new(InMemory::new()), StoreConfig::default()).await
    }

    /// The local writer.
    pub fn writer(&self) -> &WriterId {
        &self.inner.writer
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn backend(&self) -> &dyn LogBackend {
        self.inner.backend.as_ref()
    }

    fn local_log(&self) -> WriterLog<'_> {
        WriterLog::new(self.backend(), self.inner.writer.clone())
    }

    /// Writes `value` under `key` as the local writer.
    ///
    /// The node observes everything this store has ingested so far. If the
    /// log append fails the error is returned and the index is unchanged.
    pub async fn put(&self, key: &str, value: impl Into<Vec<u8>>) -> Result<Arc<Node>> {
        let key = Key::parse(key)?;
        let mut index = self.inner.index.write().await;

        let log = self.local_log();
        let seq = log.next_seq().await?;
        let node = Node::new(
            key.as_str(),
            value,
            self.inner.writer.clone(),
            seq,
            index.frontier().clone(),
        );
        log.append(node.clone()).await?;

        let node = Arc::new(node);
        let outcome = index.insert(&key, node.clone());
        debug!(
            source = %WriteSource::Local,
            key = %key,
            writer = %node.writer(),
            seq,
            heads = heads_after(&outcome),
            "Put"
        );
        Ok(node)
    }

    /// Current entry of `key`, or `None` if it was never written.
    pub async fn get(&self, key: &str) -> Result<Option<Entry>> {
        let key = Key::parse(key)?;
        let index = self.inner.index.read().await;
        Ok(index.heads(&key).map(|heads| Entry::from(heads.as_ref())))
    }

    /// Starts an iteration over a snapshot of the current state.
    ///
    /// The snapshot is taken before this returns; writes and replication
    /// that land afterwards are not observed by the iterator.
    pub async fn iter(&self, options: IterOptions) -> Result<Iter> {
        let prefix = options.parsed_prefix()?;
        let scope = self.inner.index.read().await.scope(&prefix);
        Ok(Iter::new(scope, options.recursive))
    }

    /// Collects an iteration.
    pub async fn list(&self, options: IterOptions) -> Result<Vec<Entry>> {
        self.iter(options).await?.collect()
    }

    /// Keys currently holding more than one head, sorted.
    pub async fn conflicts(&self) -> Vec<String> {
        self.inner.index.read().await.causal().conflicted_keys()
    }

    /// Number of distinct keys.
    pub async fn len(&self) -> usize {
        self.inner.index.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Everything this store has observed, per writer.
    pub async fn clock(&self) -> Clock {
        self.inner.index.read().await.frontier().clone()
    }

    /// Every node `writer` has appended that this store holds, in seq order.
    pub async fn history(&self, writer: &WriterId) -> Result<Vec<Node>> {
        WriterLog::new(self.backend(), writer.clone()).history().await
    }

    /// Highest seq held for every known writer.
    pub async fn cursors(&self) -> Result<Cursors> {
        let backend = self.backend();
        let mut cursors = Cursors::new();
        for writer in backend.writers().await? {
            if let Some(seq) = backend.latest_seq(&writer).await? {
                cursors.insert(writer, seq);
            }
        }
        Ok(cursors)
    }

    /// Appends nodes received from a peer and indexes them.
    ///
    /// Nodes of one writer must arrive in seq order. Already-held nodes are
    /// skipped, so re-delivery is harmless. Nodes applied before an error stay
    /// applied.
    ///
    /// # Returns
    /// How many nodes were new to this store.
    pub async fn ingest(&self, nodes: Vec<Node>) -> Result<usize> {
        let mut index = self.inner.index.write().await;
        let mut added = 0;
        for node in nodes {
            let key = Key::parse_stored(node.key())?;
            let log = WriterLog::new(self.backend(), node.writer().clone());
            let next = log.next_seq().await?;
            if node.seq() < next {
                continue;
            }
            if *node.writer() == self.inner.writer {
                warn!(node = %node.id(), "Rejected remote node for the local writer's log");
                return Err(ReplicationError::ForeignLocalWrite { node: node.id() }.into());
            }
            if node.seq() > next {
                warn!(node = %node.id(), expected = next, "Rejected node past a sequence gap");
                return Err(ReplicationError::SequenceGap {
                    writer: node.writer().clone(),
                    expected: next,
                    got: node.seq(),
                }
                .into());
            }

            log.append(node.clone()).await?;
            let node = Arc::new(node);
            let outcome = index.insert(&key, node.clone());
            debug!(
                source = %WriteSource::Remote,
                key = %key,
                writer = %node.writer(),
                seq = node.seq(),
                heads = heads_after(&outcome),
                "Ingested"
            );
            added += 1;
        }
        Ok(added)
    }
}

/// Head count after an insert, for logging. Zero when nothing changed.
fn heads_after(outcome: &InsertOutcome) -> usize {
    match outcome {
        InsertOutcome::Added { heads, .. } => heads.len(),
        InsertOutcome::Stale | InsertOutcome::Duplicate => 0,
    }
}
