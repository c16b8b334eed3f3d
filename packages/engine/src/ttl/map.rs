//! A concurrent, TTL-augmented associative container.
//!
//! Grounded in the source's `sync.Map`-backed `TTLMap[K, V]`: every entry
//! carries its own expiry, reads lazily evict an expired hit, and the
//! background reclaimer (`[crate::reclaimer]`) eagerly sweeps every
//! registered instance on a fixed cadence. Here the inner store is a
//! [`dashmap::DashMap`], which gives the same "readers never block writers
//! of unrelated keys" guarantee via internal sharding.

use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::registry::{self, Sweepable};

/// When an entry becomes unreachable, or never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(Instant),
}

impl Expiry {
    fn from_ttl(ttl: Option<Duration>) -> Self {
        match ttl {
            Some(ttl) => Expiry::At(Instant::now() + ttl),
            None => Expiry::Never,
        }
    }

    fn is_expired_at(self, now: Instant) -> bool {
        matches!(self, Expiry::At(at) if now >= at)
    }
}

struct Entry<V> {
    value: V,
    expiry: Expiry,
}

/// A thread-safe `K -> V` mapping where every entry carries an independent
/// expiry. `K`/`V` are held behind a `DashMap`, so concurrent access to
/// different keys never contends on the same shard lock.
pub struct TtlMap<K, V> {
    inner: DashMap<K, Entry<V>>,
}

impl<K, V> TtlMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new, empty map and registers it with the global reclaimer.
    #[must_use]
    pub fn new() -> Arc<Self> {
        let map = Arc::new(Self { inner: DashMap::new() });
        registry::register(map.clone() as Arc<dyn Sweepable>);
        map
    }

    /// Stores `(key, value)` with the given TTL. `None` means "never expires";
    /// `Some(Duration::ZERO)` means "already expired", matching the source's
    /// "ttl of zero is immediately invisible" rule (the entry is physically
    /// present until the next access or sweep, but `get` will not surface it).
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        self.inner.insert(
            key,
            Entry {
                value,
                expiry: Expiry::from_ttl(ttl),
            },
        );
    }

    /// Returns the value for `key` if present and not expired. An expired hit
    /// is lazily removed before returning `None`.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.inner.get(key) {
            if !entry.expiry.is_expired_at(now) {
                return Some(entry.value.clone());
            }
        } else {
            return None;
        }
        self.inner.remove(key);
        None
    }

    /// Removes the entry for `key` if present. Idempotent.
    pub fn delete(&self, key: &K) {
        self.inner.remove(key);
    }

    /// Count of currently-stored entries; may include expired-but-not-yet-swept
    /// entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Deterministic-order traversal (insertion-adjacent shard order) of live
    /// values, skipping `offset` and yielding at most `limit`. The consumer
    /// returns `true` to continue, `false` to stop early.
    ///
    /// Collects the live key set first, then re-checks each entry's liveness
    /// at yield time, so concurrent expiry between the two passes is
    /// tolerated rather than raced.
    pub fn range(&self, mut consumer: impl FnMut(&V) -> bool, offset: usize, limit: Option<usize>) {
        let now = Instant::now();
        let keys: Vec<K> = self
            .inner
            .iter()
            .filter(|entry| !entry.expiry.is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        let mut yielded = 0usize;
        for (i, key) in keys.into_iter().enumerate() {
            if i < offset {
                continue;
            }
            if let Some(limit) = limit {
                if yielded >= limit {
                    break;
                }
            }
            let Some(entry) = self.inner.get(&key) else { continue };
            if entry.expiry.is_expired_at(Instant::now()) {
                continue;
            }
            let value = entry.value.clone();
            drop(entry);
            yielded += 1;
            if !consumer(&value) {
                break;
            }
        }
    }

    /// Like `range` but yields `(k, v)` pairs with no pagination. Expired
    /// entries encountered along the way are lazily deleted.
    pub fn items(&self, mut consumer: impl FnMut(&K, &V) -> bool) {
        let now = Instant::now();
        let mut expired_keys = Vec::new();
        for entry in self.inner.iter() {
            if entry.expiry.is_expired_at(now) {
                expired_keys.push(entry.key().clone());
                continue;
            }
            if !consumer(entry.key(), &entry.value) {
                break;
            }
        }
        for key in expired_keys {
            self.inner.remove(&key);
        }
    }

    /// Removes every entry whose value satisfies `pred`.
    pub fn delete_all(&self, mut pred: impl FnMut(&V) -> bool) {
        self.inner.retain(|_, entry| !pred(&entry.value));
    }
}

impl<K, V> Sweepable for TtlMap<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn sweep_expired(&self, now: Instant) -> usize {
        let before = self.inner.len();
        self.inner.retain(|_, entry| !entry.expiry.is_expired_at(now));
        before - self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let map = TtlMap::<String, i32>::new();
        map.set("a".to_string(), 1, None);
        assert_eq!(map.get(&"a".to_string()), Some(1));
    }

    #[test]
    fn zero_ttl_is_immediately_invisible() {
        let map = TtlMap::<String, i32>::new();
        map.set("a".to_string(), 1, Some(Duration::ZERO));
        thread::sleep(Duration::from_millis(5));
        assert_eq!(map.get(&"a".to_string()), None);
    }

    #[test]
    fn get_after_ttl_elapses_returns_none() {
        let map = TtlMap::<String, i32>::new();
        map.set("a".to_string(), 1, Some(Duration::from_millis(10)));
        assert_eq!(map.get(&"a".to_string()), Some(1));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(map.get(&"a".to_string()), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let map = TtlMap::<String, i32>::new();
        map.set("a".to_string(), 1, None);
        map.delete(&"a".to_string());
        map.delete(&"a".to_string());
        assert_eq!(map.get(&"a".to_string()), None);
    }

    #[test]
    fn overwrite_replaces_prior_entry() {
        let map = TtlMap::<String, i32>::new();
        map.set("a".to_string(), 1, None);
        map.set("a".to_string(), 2, None);
        assert_eq!(map.get(&"a".to_string()), Some(2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn range_respects_offset_and_limit() {
        let map = TtlMap::<i32, i32>::new();
        for i in 0..10 {
            map.set(i, i, None);
        }
        let mut seen = Vec::new();
        map.range(
            |v| {
                seen.push(*v);
                true
            },
            2,
            Some(3),
        );
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn range_consumer_can_stop_early() {
        let map = TtlMap::<i32, i32>::new();
        for i in 0..10 {
            map.set(i, i, None);
        }
        let mut seen = 0;
        map.range(
            |_| {
                seen += 1;
                seen < 3
            },
            0,
            None,
        );
        assert_eq!(seen, 3);
    }

    #[test]
    fn items_skips_expired_entries() {
        let map = TtlMap::<String, i32>::new();
        map.set("live".to_string(), 1, None);
        map.set("dead".to_string(), 2, Some(Duration::ZERO));
        thread::sleep(Duration::from_millis(5));
        let mut seen = Vec::new();
        map.items(|k, v| {
            seen.push((k.clone(), *v));
            true
        });
        assert_eq!(seen, vec![("live".to_string(), 1)]);
    }

    #[test]
    fn delete_all_removes_matching_values() {
        let map = TtlMap::<i32, i32>::new();
        for i in 0..5 {
            map.set(i, i, None);
        }
        map.delete_all(|v| *v % 2 == 0);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn sweep_expired_removes_only_expired_entries() {
        let map = TtlMap::<i32, i32>::new();
        map.set(1, 1, None);
        map.set(2, 2, Some(Duration::ZERO));
        thread::sleep(Duration::from_millis(5));
        let removed = map.sweep_expired(Instant::now());
        assert_eq!(removed, 1);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn concurrent_sets_on_distinct_keys_all_land() {
        let map = TtlMap::<i32, i32>::new();
        thread::scope(|scope| {
            for i in 0..100 {
                let map = &map;
                scope.spawn(move || map.set(i, i, None));
            }
        });
        assert_eq!(map.len(), 100);
    }
}
