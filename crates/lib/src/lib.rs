//!
//! Polylog: a multi-writer replicated key-value store.
//!
//! Every replica appends its writes to its own log. Logs are exchanged
//! between replicas and folded into an index that keeps, per key, the set of
//! writes no other write has superseded.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: One write. Carries the key, the value, its
//!   writer's id and sequence number, and a clock of everything the writer
//!   had observed from other writers.
//! * **Logs (`log::LogBackend`)**: Pluggable storage holding one gapless,
//!   append-only log per writer. `log::InMemory` is the bundled backend.
//! * **Index (`index::Index`)**: A causal index resolving each key to its
//!   heads, plus a copy-on-write trie over `/`-separated keys.
//! * **Forks**: Writes to one key that do not observe each other are kept
//!   side by side and surface as `iter::Entry::Conflict` until a later write
//!   observes them all.
//! * **Iteration (`iter::Iter`)**: Lazy, ordered, snapshot-isolated traversal
//!   of the whole store or one subtree, recursive or one level deep.
//! * **Replication (`replication`)**: Cursor-based exchange of missing nodes
//!   between two stores, directly or over a `replication::ReplicationTransport`.

pub mod index;
pub mod iter;
pub mod key;
pub mod log;
pub mod node;
pub mod replication;
pub mod store;

pub use iter::{Entry, Iter, IterOptions};
pub use key::{Key, Prefix};
pub use node::{Clock, Node, NodeId, Seq, WriterId};
pub use replication::{ReplicationOutcome, ReplicationPeer};
pub use store::{Store, StoreConfig};

/// Result type used throughout the Polylog library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Polylog library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured key errors from the key module
    #[error(transparent)]
    Key(key::KeyError),

    /// Structured storage errors from the log module
    #[error(transparent)]
    Log(log::LogError),

    /// Structured replication errors from the replication module
    #[error(transparent)]
    Replication(replication::ReplicationError),

    /// Structured store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Key(_) => "key",
            Error::Log(_) => "log",
            Error::Replication(_) => "replication",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error is a rejected key or prefix.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Error::Key(_))
    }

    /// Check if the log backend failed. The failed operation was not applied.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Error::Log(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Log(log_err) => log_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is replication-related.
    pub fn is_replication_error(&self) -> bool {
        matches!(self, Error::Replication(_))
    }

    /// Check if a replication stopped part-way and can be resumed.
    pub fn is_replication_interrupted(&self) -> bool {
        match self {
            Error::Replication(replication_err) => replication_err.is_interrupted(),
            _ => false,
        }
    }

    /// Check if this error indicates internal corruption rather than bad input.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_invariant_violation(),
            _ => false,
        }
    }

    /// Check if this error is configuration-related.
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_config_error(),
            _ => false,
        }
    }
}
