//! Replication between stores.
//!
//! Replication is a cursor exchange: each side reports the highest seq it
//! holds per writer, then every node beyond the other side's cursor is
//! transferred in per-writer seq order and fed through the receiver's normal
//! ingest path. Insertion is monotone and order-independent across writers,
//! so an exchange that stops part-way leaves a valid store and running it
//! again converges to the same state.
//!
//! [`ReplicationPeer`] is what the exchange talks to. A [`Store`] is a peer
//! directly (in-process replication); [`RemotePeer`] adapts any
//! [`ReplicationTransport`] into one using the serde messages in
//! [`protocol`].

mod errors;
pub mod handler;
pub mod protocol;
pub mod transport;

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::{info, warn};

pub use errors::ReplicationError;
pub use handler::handle_request;
pub use protocol::{SyncRequest, SyncResponse};
pub use transport::{LoopbackTransport, RemotePeer, ReplicationTransport};

use crate::{
    Error, Result,
    node::{Node, Seq, WriterId},
    store::{Cursors, Store},
};

/// The other side of a replication exchange.
#[async_trait]
pub trait ReplicationPeer: Send + Sync {
    /// Highest seq the peer holds for every writer it knows.
    async fn cursors(&self) -> Result<Cursors>;

    /// The peer's nodes of `writer` with seq greater than `after`, in order.
    async fn nodes_since(
        &self,
        writer: &WriterId,
        after: Option<Seq>,
        limit: Option<usize>,
    ) -> Result<Vec<Node>>;

    /// Hands nodes to the peer. Returns how many were new to it.
    async fn receive(&self, nodes: Vec<Node>) -> Result<usize>;
}

#[async_trait]
impl ReplicationPeer for Store {
    async fn cursors(&self) -> Result<Cursors> {
        Store::cursors(self).await
    }

    async fn nodes_since(
        &self,
        writer: &WriterId,
        after: Option<Seq>,
        limit: Option<usize>,
    ) -> Result<Vec<Node>> {
        self.backend().entries_since(writer, after, limit).await
    }

    async fn receive(&self, nodes: Vec<Node>) -> Result<usize> {
        self.ingest(nodes).await
    }
}

/// Result of a completed exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplicationOutcome {
    /// Nodes ingested from the peer.
    pub pulled: usize,
    /// Nodes the peer accepted from us.
    pub pushed: usize,
}

impl ReplicationOutcome {
    /// Nothing moved in either direction.
    pub fn is_noop(&self) -> bool {
        self.pulled == 0 && self.pushed == 0
    }

    fn interrupted(&self, source: Error) -> Error {
        warn!(
            pulled = self.pulled,
            pushed = self.pushed,
            error = %source,
            "Replication interrupted"
        );
        ReplicationError::Interrupted {
            pulled: self.pulled,
            pushed: self.pushed,
            source: Box::new(source),
        }
        .into()
    }
}

impl Store {
    /// Replicates with `peer` in both directions.
    ///
    /// Afterwards both sides hold every node either held before, and their
    /// head sets agree. Any failure part-way returns
    /// [`ReplicationError::Interrupted`] carrying how far it got; nothing is
    /// rolled back and nothing is retried here.
    pub async fn replicate(&self, peer: &dyn ReplicationPeer) -> Result<ReplicationOutcome> {
        let mut outcome = ReplicationOutcome::default();
        let local = self.cursors().await?;
        let remote = peer
            .cursors()
            .await
            .map_err(|e| outcome.interrupted(e))?;
        let writers: BTreeSet<&WriterId> = local.keys().chain(remote.keys()).collect();
        let batch_size = self.config().batch_size;

        for writer in &writers {
            let target = remote.get(*writer).copied();
            let mut after = local.get(*writer).copied();
            while target > after {
                let batch = peer
                    .nodes_since(writer, after, Some(batch_size))
                    .await
                    .map_err(|e| outcome.interrupted(e))?;
                let Some(last) = batch.last() else { break };
                after = Some(last.seq());
                outcome.pulled += self
                    .ingest(batch)
                    .await
                    .map_err(|e| outcome.interrupted(e))?;
            }
        }

        for writer in &writers {
            let target = local.get(*writer).copied();
            let mut after = remote.get(*writer).copied();
            while target > after {
                let batch = self
                    .backend()
                    .entries_since(writer, after, Some(batch_size))
                    .await
                    .map_err(|e| outcome.interrupted(e))?;
                let Some(last) = batch.last() else { break };
                after = Some(last.seq());
                outcome.pushed += peer
                    .receive(batch)
                    .await
                    .map_err(|e| outcome.interrupted(e))?;
            }
        }

        info!(
            writer = %self.writer(),
            pulled = outcome.pulled,
            pushed = outcome.pushed,
            "Replication complete"
        );
        Ok(outcome)
    }
}
