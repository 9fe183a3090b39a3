use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use polylog::{
    Entry, Iter, IterOptions, Node, Result, Seq, Store, StoreConfig, WriterId,
    log::{InMemory, LogBackend, LogError},
    replication::{
        LoopbackTransport, ReplicationError, ReplicationTransport, SyncRequest, SyncResponse,
    },
};

/// Key/value contents of a store: one value per head, in head order.
pub type Contents = BTreeMap<String, Vec<String>>;

// ==========================
// STORE FACTORIES
// ==========================

/// A store over a fresh in-memory backend with a fixed writer id.
pub async fn store_as(writer: &str) -> Store {
    Store::open(
        Arc::new(InMemory::new()),
        StoreConfig::new().with_writer(writer),
    )
    .await
    .expect("Failed to open store")
}

/// Two independent stores, `writer1` and `writer2`.
pub async fn two() -> (Store, Store) {
    (store_as("writer1").await, store_as("writer2").await)
}

/// Full bidirectional replication from `a`'s side.
pub async fn replicate(a: &Store, b: &Store) {
    a.replicate(b).await.expect("Replication failed");
}

// ==========================
// DATA HELPERS
// ==========================

/// `prefix0`, `prefix1`, ... `prefix{n-1}`.
pub fn range(n: usize, prefix: &str) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

/// Each key mapped to itself as the only value.
pub fn to_map(keys: &[String]) -> Contents {
    keys.iter().map(|k| (k.clone(), vec![k.clone()])).collect()
}

/// Writes every key with itself as the value.
pub async fn put_all(store: &Store, keys: &[String]) {
    for key in keys {
        store
            .put(key, key.as_bytes().to_vec())
            .await
            .unwrap_or_else(|e| panic!("Failed to put {key}: {e}"));
    }
}

fn values(entry: &Entry) -> Vec<String> {
    entry
        .values()
        .into_iter()
        .map(|v| String::from_utf8(v.to_vec()).expect("test values are UTF-8"))
        .collect()
}

/// Drains an iterator, panicking if any key shows up twice.
pub fn all(iter: Iter) -> Result<Contents> {
    let mut contents = Contents::new();
    for entry in iter {
        let entry = entry?;
        let previous = contents.insert(entry.key().to_string(), values(&entry));
        assert!(previous.is_none(), "duplicate node for {}", entry.key());
    }
    Ok(contents)
}

/// Contents of the whole store.
pub async fn contents(store: &Store) -> Contents {
    all(store.iter(IterOptions::new()).await.expect("Failed to start iteration"))
        .expect("Iteration failed")
}

/// Builds the expected contents from literal pairs.
pub fn expected(pairs: &[(&str, &[&str])]) -> Contents {
    pairs
        .iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

// ==========================
// FAULT INJECTION
// ==========================

/// An in-memory backend whose appends can be made to fail.
#[derive(Default)]
pub struct FailingBackend {
    inner: InMemory,
    fail_appends: AtomicBool,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LogBackend for FailingBackend {
    async fn append(&self, node: Node) -> Result<Seq> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(LogError::StorageFailure {
                reason: "injected append failure".to_string(),
            }
            .into());
        }
        self.inner.append(node).await
    }

    async fn entries_since(
        &self,
        writer: &WriterId,
        after: Option<Seq>,
        limit: Option<usize>,
    ) -> Result<Vec<Node>> {
        self.inner.entries_since(writer, after, limit).await
    }

    async fn latest_seq(&self, writer: &WriterId) -> Result<Option<Seq>> {
        self.inner.latest_seq(writer).await
    }

    async fn writers(&self) -> Result<Vec<WriterId>> {
        self.inner.writers().await
    }
}

/// A loopback transport that stops delivering after a fixed number of requests.
pub struct FlakyTransport {
    inner: LoopbackTransport,
    remaining: AtomicUsize,
}

impl FlakyTransport {
    pub fn new(store: Store, budget: usize) -> Self {
        Self {
            inner: LoopbackTransport::new(store),
            remaining: AtomicUsize::new(budget),
        }
    }

    pub fn refill(&self, budget: usize) {
        self.remaining.store(budget, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReplicationTransport for FlakyTransport {
    async fn send_request(&self, request: &SyncRequest) -> Result<SyncResponse> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left == 0 {
            return Err(ReplicationError::Transport("connection reset".to_string()).into());
        }
        self.remaining.store(left - 1, Ordering::SeqCst);
        self.inner.send_request(request).await
    }
}
