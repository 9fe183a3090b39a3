//! Error types for the replication module.

use thiserror::Error;

use crate::node::{NodeId, Seq, WriterId};

/// Errors that can occur while replicating with a peer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReplicationError {
    /// The exchange stopped part-way. Everything counted here was applied
    /// and stays applied; running the replication again resumes from it.
    #[error("Replication interrupted after pulling {pulled} and pushing {pushed} nodes")]
    Interrupted {
        /// Nodes ingested locally before the failure
        pulled: usize,
        /// Nodes the peer accepted before the failure
        pushed: usize,
        /// What stopped the exchange
        #[source]
        source: Box<crate::Error>,
    },

    /// The transport could not deliver a request or its response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The peer reported a failure while handling a request.
    #[error("Peer error: {0}")]
    Remote(String),

    /// Unexpected response type received from peer.
    #[error("Unexpected response type: expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: String,
    },

    /// A received node does not continue its writer's log.
    #[error("Sequence gap for {writer}: expected seq {expected}, got {got}")]
    SequenceGap {
        writer: WriterId,
        expected: Seq,
        got: Seq,
    },

    /// A peer offered a node for the local writer that the local writer never wrote.
    #[error("Peer offered node {node} for the local writer's own log")]
    ForeignLocalWrite { node: NodeId },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ReplicationError {
    /// Check if the exchange stopped part-way and can be resumed.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ReplicationError::Interrupted { .. })
    }

    /// Check if a peer sent nodes that violate log invariants.
    pub fn is_invalid_node(&self) -> bool {
        matches!(
            self,
            ReplicationError::SequenceGap { .. } | ReplicationError::ForeignLocalWrite { .. }
        )
    }

    /// Check if this is a transport or peer communication failure.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            ReplicationError::Transport(_)
                | ReplicationError::Remote(_)
                | ReplicationError::UnexpectedResponse { .. }
                | ReplicationError::Serialization(_)
        )
    }

    /// Progress made before an interruption, as `(pulled, pushed)`.
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self {
            ReplicationError::Interrupted { pulled, pushed, .. } => Some((*pulled, *pushed)),
            _ => None,
        }
    }
}

impl From<ReplicationError> for crate::Error {
    fn from(err: ReplicationError) -> Self {
        crate::Error::Replication(err)
    }
}
