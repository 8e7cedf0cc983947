use super::entry::{Entry, Value};
use indexmap::IndexSet;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

type Key = Vec<u8>;

/// Result of a mutating or reading operation against the pool.
///
/// `Type` is never produced today: increment/decrement coercion is total
/// (see `Value::coerce_to_int`), so it can't fail. It's kept in the
/// vocabulary because the wire protocol documents `TYPE` as a reply token.
#[derive(Debug, Clone, PartialEq)]
pub enum OpResult {
    Ok,
    Miss,
    Exists,
    Type,
    Value(Value),
    Int(i64),
    Bool(bool),
    Count(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolStatus {
    pub items: usize,
    pub oldest: Option<String>,
    pub newest: Option<String>,
    pub lru: Option<String>,
}

/// The cache engine's interior state. Never accessed concurrently: every
/// public `Pool` method takes the single mutex for its whole duration, so
/// nothing in here needs its own locking.
struct PoolInner {
    map: HashMap<Key, Entry>,
    /// Keys in the order first inserted. Not reordered on update; shrinks on
    /// delete/expiry/flush so it always matches the live key set.
    insertion_order: IndexSet<Key>,
    /// Keys ordered least-recently-used .. most-recently-used.
    recency: IndexSet<Key>,
}

impl PoolInner {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
            insertion_order: IndexSet::new(),
            recency: IndexSet::new(),
        }
    }

    fn touch_recency(&mut self, key: &Key) {
        self.recency.shift_remove(key);
        self.recency.insert(key.clone());
    }

    fn remove_key(&mut self, key: &Key) -> Option<Entry> {
        self.insertion_order.shift_remove(key);
        self.recency.shift_remove(key);
        self.map.remove(key)
    }

    fn expire_if_needed(&mut self, key: &Key, now: u64) -> bool {
        let expired = matches!(self.map.get(key), Some(e) if e.is_expired(now));
        if expired {
            self.remove_key(key);
        }
        expired
    }
}

/// The cache engine. Cheap to clone: all clones share the same underlying
/// state via `Arc<Mutex<..>>`.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<Mutex<PoolInner>>,
}

impl Pool {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PoolInner::new())),
        }
    }

    pub async fn add(&self, key: &[u8], value: Value, ttl_seconds: u64, now: u64) -> OpResult {
        let mut inner = self.inner.lock().await;
        inner.expire_if_needed(&key.to_vec(), now);
        if inner.map.contains_key(key) {
            return OpResult::Exists;
        }
        let k = key.to_vec();
        inner.map.insert(k.clone(), Entry::new(value, now, ttl_seconds));
        inner.insertion_order.insert(k.clone());
        inner.recency.insert(k);
        OpResult::Ok
    }

    pub async fn set(&self, key: &[u8], value: Value, ttl_seconds: u64, now: u64) -> OpResult {
        let mut inner = self.inner.lock().await;
        let k = key.to_vec();
        inner.map.insert(k.clone(), Entry::new(value, now, ttl_seconds));
        // insertion index unchanged if key already present
        inner.insertion_order.insert(k.clone());
        inner.touch_recency(&k);
        OpResult::Ok
    }

    pub async fn replace(&self, key: &[u8], value: Value, ttl_seconds: u64, now: u64) -> OpResult {
        let mut inner = self.inner.lock().await;
        let k = key.to_vec();
        if inner.expire_if_needed(&k, now) || !inner.map.contains_key(key) {
            return OpResult::Miss;
        }
        inner.map.insert(k.clone(), Entry::new(value, now, ttl_seconds));
        inner.touch_recency(&k);
        OpResult::Ok
    }

    pub async fn get(&self, key: &[u8], now: u64) -> OpResult {
        let mut inner = self.inner.lock().await;
        let k = key.to_vec();
        if inner.expire_if_needed(&k, now) {
            return OpResult::Miss;
        }
        match inner.map.get_mut(key) {
            Some(entry) => {
                entry.touch(now);
                let value = entry.value.clone();
                inner.touch_recency(&k);
                OpResult::Value(value)
            }
            None => OpResult::Miss,
        }
    }

    pub async fn has(&self, key: &[u8], now: u64) -> OpResult {
        let mut inner = self.inner.lock().await;
        let k = key.to_vec();
        if inner.expire_if_needed(&k, now) {
            return OpResult::Bool(false);
        }
        match inner.map.get_mut(key) {
            Some(entry) => {
                entry.touch(now);
                inner.touch_recency(&k);
                OpResult::Bool(true)
            }
            None => OpResult::Bool(false),
        }
    }

    pub async fn delete(&self, key: &[u8]) -> OpResult {
        let mut inner = self.inner.lock().await;
        match inner.remove_key(&key.to_vec()) {
            Some(_) => OpResult::Ok,
            None => OpResult::Miss,
        }
    }

    pub async fn increment(&self, key: &[u8], ttl_seconds: Option<u64>, now: u64) -> OpResult {
        self.step(key, 1, ttl_seconds, now).await
    }

    pub async fn decrement(&self, key: &[u8], ttl_seconds: Option<u64>, now: u64) -> OpResult {
        self.step(key, -1, ttl_seconds, now).await
    }

    async fn step(&self, key: &[u8], delta: i64, ttl_seconds: Option<u64>, now: u64) -> OpResult {
        let mut inner = self.inner.lock().await;
        let k = key.to_vec();
        if inner.expire_if_needed(&k, now) {
            return OpResult::Miss;
        }
        let Some(entry) = inner.map.get(key) else {
            return OpResult::Miss;
        };
        let new_value = entry.value.coerce_to_int().saturating_add(delta);
        let ttl = ttl_seconds.unwrap_or(entry.ttl_seconds);
        let new_inserted_at = if ttl_seconds.map(|t| t > 0).unwrap_or(false) {
            now
        } else {
            entry.inserted_at
        };
        let entry = inner.map.get_mut(key).expect("checked above");
        entry.value = Value::Int(new_value);
        entry.inserted_at = new_inserted_at;
        entry.ttl_seconds = ttl;
        entry.touch(now);
        inner.touch_recency(&k);
        OpResult::Int(new_value)
    }

    pub async fn flush(&self) -> OpResult {
        let mut inner = self.inner.lock().await;
        let count = inner.map.len();
        inner.map.clear();
        inner.insertion_order.clear();
        inner.recency.clear();
        OpResult::Count(count)
    }

    pub async fn item_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.map.len()
    }

    pub async fn status(&self) -> PoolStatus {
        let inner = self.inner.lock().await;
        let key_to_string = |k: &Key| String::from_utf8_lossy(k).into_owned();
        PoolStatus {
            items: inner.map.len(),
            oldest: inner.insertion_order.first().map(key_to_string),
            newest: inner.insertion_order.last().map(key_to_string),
            lru: inner.recency.first().map(key_to_string),
        }
    }

    pub async fn clear_stale(&self, now: u64) -> usize {
        let mut inner = self.inner.lock().await;
        let stale: Vec<Key> = inner
            .map
            .iter()
            .filter(|(_, e)| e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        for k in &stale {
            inner.remove_key(k);
        }
        stale.len()
    }

    /// Removes the oldest half (by recency) of currently live entries:
    /// `floor(n/2)` keys starting from the LRU end.
    pub async fn clear_least_recently_used(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let n = inner.recency.len();
        let to_remove = n / 2;
        let victims: Vec<Key> = inner.recency.iter().take(to_remove).cloned().collect();
        for k in &victims {
            inner.remove_key(k);
        }
        victims.len()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::Str(v.to_string())
    }

    #[tokio::test]
    async fn set_then_get_roundtrips() {
        let pool = Pool::new();
        assert_eq!(pool.set(b"foo", s("hello"), 0, 0).await, OpResult::Ok);
        assert_eq!(
            pool.get(b"foo", 0).await,
            OpResult::Value(Value::Str("hello".into()))
        );
    }

    #[tokio::test]
    async fn add_existing_key_returns_exists_and_keeps_original() {
        let pool = Pool::new();
        assert_eq!(pool.add(b"x", Value::Int(10), 0, 0).await, OpResult::Ok);
        assert_eq!(
            pool.add(b"x", Value::Int(20), 0, 0).await,
            OpResult::Exists
        );
        assert_eq!(pool.get(b"x", 0).await, OpResult::Value(Value::Int(10)));
    }

    #[tokio::test]
    async fn ttl_expiry_yields_miss() {
        let pool = Pool::new();
        pool.set(b"t", s("bye"), 1, 0).await;
        assert_eq!(
            pool.get(b"t", 0).await,
            OpResult::Value(Value::Str("bye".into()))
        );
        assert_eq!(pool.get(b"t", 1).await, OpResult::Miss);
    }

    #[tokio::test]
    async fn increment_then_decrement_restores_value() {
        let pool = Pool::new();
        pool.set(b"counter", Value::Int(0), 0, 0).await;
        for expected in [1, 2, 3, 4] {
            assert_eq!(
                pool.increment(b"counter", None, 0).await,
                OpResult::Int(expected)
            );
        }
        assert_eq!(pool.decrement(b"counter", None, 0).await, OpResult::Int(3));
    }

    #[tokio::test]
    async fn clear_stale_is_idempotent() {
        let pool = Pool::new();
        pool.set(b"a", s("v"), 1, 0).await;
        assert_eq!(pool.clear_stale(5).await, 1);
        assert_eq!(pool.clear_stale(5).await, 0);
    }

    #[tokio::test]
    async fn lru_eviction_takes_floor_half_from_lru_end() {
        let pool = Pool::new();
        for k in [b"a" as &[u8], b"b", b"c", b"d"] {
            pool.set(k, s("v"), 0, 0).await;
        }
        for k in [b"a" as &[u8], b"b", b"c", b"d", b"a"] {
            pool.get(k, 0).await;
        }
        let removed = pool.clear_least_recently_used().await;
        assert_eq!(removed, 2);
        assert_eq!(pool.has(b"b", 0).await, OpResult::Bool(false));
        assert_eq!(pool.has(b"c", 0).await, OpResult::Bool(false));
        assert_eq!(pool.has(b"a", 0).await, OpResult::Bool(true));
        assert_eq!(pool.has(b"d", 0).await, OpResult::Bool(true));
    }

    #[tokio::test]
    async fn lru_eviction_never_removes_sole_mru_key_with_two_or_more_items() {
        let pool = Pool::new();
        pool.set(b"a", s("v"), 0, 0).await;
        pool.set(b"b", s("v"), 0, 0).await;
        pool.get(b"b", 0).await;
        pool.clear_least_recently_used().await;
        assert_eq!(pool.has(b"b", 0).await, OpResult::Bool(true));
    }

    #[tokio::test]
    async fn flush_reports_count_and_resets_status() {
        let pool = Pool::new();
        pool.set(b"a", s("v"), 0, 0).await;
        pool.set(b"b", s("v"), 0, 0).await;
        pool.set(b"c", s("v"), 0, 0).await;
        assert_eq!(pool.flush().await, OpResult::Count(3));
        let status = pool.status().await;
        assert_eq!(status.items, 0);
        assert_eq!(status.oldest, None);
        assert_eq!(status.newest, None);
        assert_eq!(status.lru, None);
    }

    #[tokio::test]
    async fn item_count_tracks_map_and_indices() {
        let pool = Pool::new();
        pool.set(b"a", s("v"), 0, 0).await;
        pool.add(b"b", s("v"), 0, 0).await;
        assert_eq!(pool.item_count().await, 2);
        pool.delete(b"a").await;
        assert_eq!(pool.item_count().await, 1);
    }
}
