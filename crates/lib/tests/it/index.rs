//! Fork detection and resolution across two writers.

use polylog::{Entry, IterOptions};

use crate::helpers::*;

/// Writer1 writes `0`, writer2 writes `2..=9`, they sync, then both write
/// `1` without seeing each other, sync, and writer1 overwrites `0`.
async fn fork_setup() -> (polylog::Store, polylog::Store) {
    let (db1, db2) = two().await;
    db1.put("0", b"0".to_vec()).await.unwrap();
    for i in 2..=9 {
        let v = i.to_string();
        db2.put(&v, v.as_bytes().to_vec()).await.unwrap();
    }
    replicate(&db1, &db2).await;

    db1.put("1", b"1a".to_vec()).await.unwrap();
    db2.put("1", b"1b".to_vec()).await.unwrap();
    replicate(&db1, &db2).await;

    db1.put("0", b"00".to_vec()).await.unwrap();
    (db1, db2)
}

fn base_expectation() -> Contents {
    expected(&[
        ("0", &["00"]),
        ("1", &["1a", "1b"]),
        ("2", &["2"]),
        ("3", &["3"]),
        ("4", &["4"]),
        ("5", &["5"]),
        ("6", &["6"]),
        ("7", &["7"]),
        ("8", &["8"]),
        ("9", &["9"]),
    ])
}

#[tokio::test]
async fn test_two_writers_one_fork() {
    let (db1, db2) = fork_setup().await;
    replicate(&db1, &db2).await;
    db2.put("hi", b"ho".to_vec()).await.unwrap();

    let want = base_expectation();
    assert_eq!(contents(&db1).await, want);

    let mut want = want;
    want.insert("hi".to_string(), vec!["ho".to_string()]);
    assert_eq!(contents(&db2).await, want);

    assert_eq!(db1.conflicts().await, ["1"]);
    assert_eq!(db2.conflicts().await, ["1"]);
}

#[tokio::test]
async fn test_two_writers_one_fork_many_values() {
    let (db1, db2) = fork_setup().await;
    let r = range(100, "i");
    put_all(&db1, &r).await;
    replicate(&db1, &db2).await;

    let mut want = base_expectation();
    want.extend(to_map(&r));
    assert_eq!(contents(&db1).await, want);
    assert_eq!(contents(&db2).await, want);
}

#[tokio::test]
async fn test_concurrent_writes_surface_as_conflict() {
    let (a, b) = two().await;
    a.put("k", b"v1".to_vec()).await.unwrap();
    b.put("k", b"v2".to_vec()).await.unwrap();
    replicate(&a, &b).await;

    for store in [&a, &b] {
        match store.get("k").await.unwrap() {
            Some(Entry::Conflict(nodes)) => {
                let mut values: Vec<&[u8]> = nodes.iter().map(|n| n.value()).collect();
                values.sort();
                assert_eq!(values, [&b"v1"[..], &b"v2"[..]]);
            }
            other => panic!("expected a conflict, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_causal_write_supersedes() {
    let (a, b) = two().await;
    a.put("k", b"v1".to_vec()).await.unwrap();
    replicate(&a, &b).await;

    b.put("k", b"v2".to_vec()).await.unwrap();
    a.replicate(&b).await.unwrap();

    let entry = a.get("k").await.unwrap().unwrap();
    assert!(!entry.is_conflict());
    assert_eq!(entry.value(), Some(&b"v2"[..]));
    assert!(a.conflicts().await.is_empty());
}

#[tokio::test]
async fn test_fork_resolved_by_later_write() {
    let (a, b) = two().await;
    a.put("k", b"v1".to_vec()).await.unwrap();
    b.put("k", b"v2".to_vec()).await.unwrap();
    replicate(&a, &b).await;
    assert_eq!(a.conflicts().await, ["k"]);

    b.put("k", b"merged".to_vec()).await.unwrap();
    replicate(&a, &b).await;

    for store in [&a, &b] {
        assert_eq!(contents(store).await, expected(&[("k", &["merged"])]));
    }
}

#[tokio::test]
async fn test_conflict_order_is_stable() {
    let (a, b) = two().await;
    b.put("k", b"from2".to_vec()).await.unwrap();
    a.put("k", b"from1".to_vec()).await.unwrap();
    b.replicate(&a).await.unwrap();

    for store in [&a, &b] {
        let entries = store.list(IterOptions::new()).await.unwrap();
        let writers: Vec<&str> = entries[0].nodes().iter().map(|n| n.writer().as_str()).collect();
        assert_eq!(writers, ["writer1", "writer2"]);
    }
}

#[tokio::test]
async fn test_independent_keys_never_conflict() {
    let (a, b) = two().await;
    put_all(&a, &range(20, "a/")).await;
    put_all(&b, &range(20, "b/")).await;
    replicate(&a, &b).await;

    assert!(a.conflicts().await.is_empty());
    assert_eq!(a.len().await, 40);
    assert_eq!(contents(&a).await, contents(&b).await);
}
