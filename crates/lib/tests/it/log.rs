use std::sync::Arc;

use tempfile::TempDir;

use polylog::{
    Clock, Node, Store, StoreConfig, WriterId,
    log::{InMemory, LogBackend, WriterLog},
};

use crate::helpers::*;

#[tokio::test]
async fn test_save_and_load_restores_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("logs.json");

    let backend = Arc::new(InMemory::new());
    let config = StoreConfig::new().with_writer("w1");
    let store = Store::open(backend.clone(), config.clone()).await.unwrap();
    let peer = store_as("w2").await;
    store.put("a/b", vec![0u8, 1, 2, 254]).await.unwrap();
    peer.put("a/b", b"concurrent".to_vec()).await.unwrap();
    put_all(&peer, &range(5, "p/")).await;
    replicate(&store, &peer).await;
    let before = store.list(Default::default()).await.unwrap();

    backend.save_to_file(&path).await.unwrap();
    assert!(path.exists());

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.len().await, 7);
    let restored = Store::open(Arc::new(loaded), config).await.unwrap();
    assert_eq!(restored.list(Default::default()).await.unwrap(), before);
    assert_eq!(restored.cursors().await.unwrap(), store.cursors().await.unwrap());
}

#[tokio::test]
async fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let backend = InMemory::load_from_file(dir.path().join("absent.json"))
        .await
        .unwrap();
    assert!(backend.is_empty().await);
    assert!(backend.writers().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_load_corrupt_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corrupt.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_storage_failure());
    assert!(err.is_io_error());
}

#[tokio::test]
async fn test_writer_log_view() {
    let backend = InMemory::new();
    let writer = WriterId::from("w");
    let log = WriterLog::new(&backend, writer.clone());
    assert_eq!(log.next_seq().await.unwrap(), 0);
    assert_eq!(log.latest_seq().await.unwrap(), None);

    for seq in 0..4 {
        let node = Node::new(format!("k{seq}"), b"v".to_vec(), writer.clone(), seq, Clock::new());
        assert_eq!(log.append(node).await.unwrap(), seq);
    }
    assert_eq!(log.latest_seq().await.unwrap(), Some(3));

    let tail = log.entries_since(Some(1), None).await.unwrap();
    let seqs: Vec<u64> = tail.iter().map(|n| n.seq()).collect();
    assert_eq!(seqs, [2, 3]);
    assert_eq!(log.history().await.unwrap().len(), 4);

    let stranger = Node::new("k", b"v".to_vec(), WriterId::from("other"), 4, Clock::new());
    assert!(log.append(stranger).await.unwrap_err().is_storage_failure());

    let gap = Node::new("k", b"v".to_vec(), writer, 9, Clock::new());
    assert!(log.append(gap).await.unwrap_err().is_storage_failure());
}
