use polylog::{IterOptions, Store};

use crate::helpers::*;

#[tokio::test]
async fn test_basic_iteration() {
    let store = Store::in_memory().await.unwrap();
    let vals: Vec<String> = ["a", "b", "c"].map(String::from).to_vec();
    put_all(&store, &vals).await;

    assert_eq!(contents(&store).await, to_map(&vals));
}

#[tokio::test]
async fn test_iterate_big_store() {
    let store = Store::in_memory().await.unwrap();
    let vals = range(4000, "#");
    put_all(&store, &vals).await;

    let map = contents(&store).await;
    assert_eq!(map.len(), 4000);
    assert_eq!(map, to_map(&vals));
}

#[tokio::test]
async fn test_prefix_iteration() {
    let store = Store::in_memory().await.unwrap();
    let scoped: Vec<String> = ["foo/a", "foo/b", "foo/c"].map(String::from).to_vec();
    put_all(&store, &scoped).await;
    put_all(&store, &["a", "b", "c"].map(String::from)).await;

    let iter = store.iter(IterOptions::new().prefix("foo")).await.unwrap();
    assert_eq!(all(iter).unwrap(), to_map(&scoped));
}

#[tokio::test]
async fn test_prefix_matches_whole_segments_only() {
    let store = Store::in_memory().await.unwrap();
    put_all(&store, &["foo/a", "foobar", "foobar/b", "fo/o"].map(String::from)).await;

    let iter = store.iter(IterOptions::new().prefix("foo")).await.unwrap();
    let keys: Vec<String> = all(iter).unwrap().into_keys().collect();
    assert_eq!(keys, ["foo/a"]);
}

#[tokio::test]
async fn test_prefix_includes_the_prefix_key_itself() {
    let store = Store::in_memory().await.unwrap();
    put_all(&store, &["foo", "foo/a", "other"].map(String::from)).await;

    let iter = store.iter(IterOptions::new().prefix("/foo/")).await.unwrap();
    let keys: Vec<String> = all(iter).unwrap().into_keys().collect();
    assert_eq!(keys, ["foo", "foo/a"]);
}

#[tokio::test]
async fn test_empty_prefix_iteration() {
    let store = Store::in_memory().await.unwrap();
    put_all(&store, &["foo/a", "foo/b", "foo/c"].map(String::from)).await;

    let iter = store.iter(IterOptions::new().prefix("bar")).await.unwrap();
    assert!(all(iter).unwrap().is_empty());
}

#[tokio::test]
async fn test_root_prefix_means_everything() {
    let store = Store::in_memory().await.unwrap();
    let vals: Vec<String> = ["x", "y/z"].map(String::from).to_vec();
    put_all(&store, &vals).await;

    for prefix in ["", "/"] {
        let iter = store.iter(IterOptions::new().prefix(prefix)).await.unwrap();
        assert_eq!(all(iter).unwrap(), to_map(&vals), "prefix {prefix:?}");
    }
}

#[tokio::test]
async fn test_invalid_prefix_is_rejected() {
    let store = Store::in_memory().await.unwrap();
    let err = store
        .iter(IterOptions::new().prefix("a//b"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_key());
}

#[tokio::test]
async fn test_prefix_iterate_big_store() {
    let store = Store::in_memory().await.unwrap();
    let scoped = range(4000, "foo/#");
    put_all(&store, &scoped).await;
    put_all(&store, &range(4000, "#")).await;

    let iter = store.iter(IterOptions::new().prefix("foo")).await.unwrap();
    assert_eq!(all(iter).unwrap(), to_map(&scoped));
}

#[tokio::test]
async fn test_non_recursive_iteration() {
    let store = Store::in_memory().await.unwrap();
    put_all(
        &store,
        &["a", "a/b/c/d", "a/c", "b", "b/b/c", "c/a", "c"].map(String::from),
    )
    .await;

    let iter = store.iter(IterOptions::new().recursive(false)).await.unwrap();
    let map = all(iter).unwrap();
    let mut tops: Vec<&str> = map
        .keys()
        .map(|k| k.split('/').next().unwrap_or_default())
        .collect();
    tops.sort();
    assert_eq!(tops, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_non_recursive_child_without_own_value() {
    let store = Store::in_memory().await.unwrap();
    put_all(&store, &["dir/sub/x", "dir/sub/y", "dir/file"].map(String::from)).await;

    let iter = store
        .iter(IterOptions::new().prefix("dir").recursive(false))
        .await
        .unwrap();
    let keys: Vec<String> = all(iter).unwrap().into_keys().collect();
    assert_eq!(keys, ["dir/file", "dir/sub/x"]);
}

#[tokio::test]
async fn test_iteration_is_a_snapshot() {
    let store = Store::in_memory().await.unwrap();
    put_all(&store, &["a", "c"].map(String::from)).await;

    let mut iter = store.iter(IterOptions::new()).await.unwrap();
    let first = iter.next().unwrap().unwrap();
    assert_eq!(first.key(), "a");

    store.put("b", b"late".to_vec()).await.unwrap();
    store.put("c", b"changed".to_vec()).await.unwrap();

    let rest: Vec<_> = iter.collect::<polylog::Result<_>>().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].key(), "c");
    assert_eq!(rest[0].value(), Some(&b"c"[..]));

    let after = contents(&store).await;
    assert_eq!(after["b"], ["late"]);
    assert_eq!(after["c"], ["changed"]);
}

#[tokio::test]
async fn test_iteration_order_follows_segments() {
    let store = Store::in_memory().await.unwrap();
    put_all(&store, &["a/b", "a-b", "a", "a/a/z"].map(String::from)).await;

    let keys: Vec<String> = store
        .list(IterOptions::new())
        .await
        .unwrap()
        .iter()
        .map(|e| e.key().to_string())
        .collect();
    assert_eq!(keys, ["a", "a/a/z", "a/b", "a-b"]);
}
