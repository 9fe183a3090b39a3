//! Transport abstraction for replication.
//!
//! A [`ReplicationTransport`] moves one [`SyncRequest`] to a peer and brings
//! its [`SyncResponse`] back. [`RemotePeer`] turns any transport into a
//! [`ReplicationPeer`], so [`Store::replicate`] runs unchanged over it.

use async_trait::async_trait;

use super::{
    ReplicationError, ReplicationPeer,
    handler::handle_request,
    protocol::{SyncRequest, SyncResponse},
};
use crate::{
    Result,
    node::{Node, Seq, WriterId},
    store::{Cursors, Store},
};

/// Trait for carrying replication requests over some medium.
#[async_trait]
pub trait ReplicationTransport: Send + Sync {
    /// Send a request to the peer and wait for its response.
    ///
    /// # Returns
    /// The response from the peer, or an error if delivery failed. A peer
    /// that handled the request but failed reports that in-band as
    /// [`SyncResponse::Error`].
    async fn send_request(&self, request: &SyncRequest) -> Result<SyncResponse>;
}

/// A peer reached through a transport.
#[derive(Debug, Clone)]
pub struct RemotePeer<T> {
    transport: T,
}

impl<T: ReplicationTransport> RemotePeer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    async fn call(&self, request: SyncRequest) -> Result<SyncResponse> {
        match self.transport.send_request(&request).await? {
            SyncResponse::Error(msg) => Err(ReplicationError::Remote(msg).into()),
            response => Ok(response),
        }
    }
}

fn unexpected(expected: &'static str, response: SyncResponse) -> crate::Error {
    ReplicationError::UnexpectedResponse {
        expected,
        actual: response.kind().to_string(),
    }
    .into()
}

#[async_trait]
impl<T: ReplicationTransport> ReplicationPeer for RemotePeer<T> {
    async fn cursors(&self) -> Result<Cursors> {
        match self.call(SyncRequest::Cursors).await? {
            SyncResponse::Cursors(cursors) => Ok(cursors),
            other => Err(unexpected("Cursors", other)),
        }
    }

    async fn nodes_since(
        &self,
        writer: &WriterId,
        after: Option<Seq>,
        limit: Option<usize>,
    ) -> Result<Vec<Node>> {
        let request = SyncRequest::NodesSince {
            writer: writer.clone(),
            after,
            limit,
        };
        match self.call(request).await? {
            SyncResponse::Nodes(nodes) => Ok(nodes),
            other => Err(unexpected("Nodes", other)),
        }
    }

    async fn receive(&self, nodes: Vec<Node>) -> Result<usize> {
        match self.call(SyncRequest::Receive(nodes)).await? {
            SyncResponse::Received(count) => Ok(count),
            other => Err(unexpected("Received", other)),
        }
    }
}

/// In-process transport that serves requests from a local store.
///
/// Requests and responses pass through JSON on the way, so everything a
/// network transport would have to encode gets encoded.
#[derive(Debug, Clone)]
pub struct LoopbackTransport {
    store: Store,
}

impl LoopbackTransport {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ReplicationTransport for LoopbackTransport {
    async fn send_request(&self, request: &SyncRequest) -> Result<SyncResponse> {
        let bytes = serde_json::to_vec(request)
            .map_err(|e| ReplicationError::Serialization(format!("request: {e}")))?;
        let request: SyncRequest = serde_json::from_slice(&bytes)
            .map_err(|e| ReplicationError::Serialization(format!("request: {e}")))?;

        let response = handle_request(&self.store, &request).await;

        let bytes = serde_json::to_vec(&response)
            .map_err(|e| ReplicationError::Serialization(format!("response: {e}")))?;
        let response = serde_json::from_slice(&bytes)
            .map_err(|e| ReplicationError::Serialization(format!("response: {e}")))?;
        Ok(response)
    }
}
