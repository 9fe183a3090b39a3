//! Serving replication requests.
//!
//! Transport-agnostic: a transport decodes a [`SyncRequest`], hands it here
//! with the store it serves, and encodes the returned [`SyncResponse`].

use tracing::warn;

use super::{
    ReplicationPeer,
    protocol::{SyncRequest, SyncResponse},
};
use crate::store::Store;

/// Handle a replication request against `store`.
///
/// Failures are reported in-band as [`SyncResponse::Error`] so the caller
/// always has something to send back.
pub async fn handle_request(store: &Store, request: &SyncRequest) -> SyncResponse {
    let result = match request {
        SyncRequest::Cursors => store.cursors().await.map(SyncResponse::Cursors),
        SyncRequest::NodesSince {
            writer,
            after,
            limit,
        } => ReplicationPeer::nodes_since(store, writer, *after, *limit)
            .await
            .map(SyncResponse::Nodes),
        SyncRequest::Receive(nodes) => store.ingest(nodes.clone()).await.map(SyncResponse::Received),
    };

    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to handle replication request");
        SyncResponse::Error(e.to_string())
    })
}
