/// Cache Pool Edge Cases Tests
///
/// Covers the cross-cutting invariants from the pool's contract rather than
/// single-operation behavior (which is unit-tested alongside the pool).
use ephemcache::cache::{OpResult, Pool, Value};

#[tokio::test]
async fn item_count_matches_both_orderings_after_mixed_operations() {
    let pool = Pool::new();
    pool.set(b"a", Value::Str("1".into()), 0, 0).await;
    pool.add(b"b", Value::Str("2".into()), 0, 0).await;
    pool.set(b"c", Value::Str("3".into()), 5, 0).await;
    pool.delete(b"a").await;
    pool.clear_stale(10).await; // expires c

    let status = pool.status().await;
    assert_eq!(pool.item_count().await, status.items);
    assert_eq!(status.items, 1);
}

#[tokio::test]
async fn replace_never_creates_a_missing_key() {
    let pool = Pool::new();
    assert_eq!(
        pool.replace(b"ghost", Value::Str("x".into()), 0, 0).await,
        OpResult::Miss
    );
    assert_eq!(pool.item_count().await, 0);
}

#[tokio::test]
async fn set_on_existing_key_preserves_insertion_order_but_moves_recency() {
    let pool = Pool::new();
    pool.set(b"a", Value::Str("1".into()), 0, 0).await;
    pool.set(b"b", Value::Str("1".into()), 0, 0).await;
    // Re-setting "a" should not move it in the insertion-order index.
    pool.set(b"a", Value::Str("2".into()), 0, 0).await;

    let status = pool.status().await;
    assert_eq!(status.oldest.as_deref(), Some("a"));
    assert_eq!(status.newest.as_deref(), Some("b"));
    // But recency now favors "a" since it was the most recently written.
    assert_eq!(status.lru.as_deref(), Some("b"));
}

#[tokio::test]
async fn increment_resets_ttl_only_when_a_positive_ttl_is_supplied() {
    let pool = Pool::new();
    pool.set(b"counter", Value::Int(0), 100, 0).await;

    // No ttl argument: original expiry clock keeps running from t=0.
    pool.increment(b"counter", None, 50).await;
    assert_eq!(
        pool.get(b"counter", 150).await,
        OpResult::Miss,
        "original TTL should still apply when no new ttl is given"
    );

    let pool = Pool::new();
    pool.set(b"counter", Value::Int(0), 100, 0).await;
    // A fresh positive ttl resets the expiry clock to the increment's `now`.
    pool.increment(b"counter", Some(100), 50).await;
    assert_eq!(
        pool.get(b"counter", 149).await,
        OpResult::Value(Value::Int(1))
    );
}

#[tokio::test]
async fn clear_least_recently_used_is_a_noop_on_an_empty_pool() {
    let pool = Pool::new();
    assert_eq!(pool.clear_least_recently_used().await, 0);
}

#[tokio::test]
async fn flush_on_three_item_pool_resets_status() {
    let pool = Pool::new();
    pool.set(b"a", Value::Str("v".into()), 0, 0).await;
    pool.set(b"b", Value::Str("v".into()), 0, 0).await;
    pool.set(b"c", Value::Str("v".into()), 0, 0).await;

    assert_eq!(pool.flush().await, OpResult::Count(3));

    let status = pool.status().await;
    assert_eq!(status.items, 0);
    assert!(status.oldest.is_none() && status.newest.is_none() && status.lru.is_none());
}
