//! Protocol definitions for replication.
//!
//! Transport-agnostic messages mirroring the [`ReplicationPeer`](super::ReplicationPeer)
//! operations, so any transport that can carry serde values can carry a
//! replication exchange.

use serde::{Deserialize, Serialize};

use crate::{
    node::{Node, Seq, WriterId},
    store::Cursors,
};

/// Request messages that can be sent to a replication peer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SyncRequest {
    /// Ask for the peer's per-writer cursors.
    Cursors,
    /// Ask for nodes of one writer past a cursor.
    NodesSince {
        writer: WriterId,
        after: Option<Seq>,
        limit: Option<usize>,
    },
    /// Deliver nodes to the peer.
    Receive(Vec<Node>),
}

/// Response messages returned from a replication peer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum SyncResponse {
    Cursors(Cursors),
    Nodes(Vec<Node>),
    /// Number of delivered nodes that were new to the peer.
    Received(usize),
    /// The peer failed to handle the request.
    Error(String),
}

impl SyncResponse {
    /// Short name of the variant, for error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncResponse::Cursors(_) => "Cursors",
            SyncResponse::Nodes(_) => "Nodes",
            SyncResponse::Received(_) => "Received",
            SyncResponse::Error(_) => "Error",
        }
    }
}
