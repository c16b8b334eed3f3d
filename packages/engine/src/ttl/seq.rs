//! An append-only, TTL-indexed ordered collection built on [`TtlMap`].
//!
//! Grounded in the source's `TTLSlice[T]`, with one deliberate correction:
//! the source assigns each append's key as `Len()+1`, which races when two appenders observe
//! the same length concurrently. Here the position is handed out by a
//! dedicated `AtomicU64` counter, incremented exactly once per successful
//! append, so two concurrent appenders can never collide on the same key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::map::TtlMap;

/// Append-only sequence of `V`, keyed by an ever-increasing position. Deleted
/// positions are never reused, so the key space can become sparse.
pub struct TtlSeq<V> {
    inner: Arc<TtlMap<u64, V>>,
    next_key: AtomicU64,
}

impl<V> TtlSeq<V>
where
    V: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: TtlMap::new(),
            next_key: AtomicU64::new(1),
        }
    }

    /// Appends `value` with the given TTL and returns the position it was
    /// stored under.
    pub fn append(&self, value: V, ttl: Option<Duration>) -> u64 {
        let key = self.next_key.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl);
        key
    }

    #[must_use]
    pub fn get(&self, index: u64) -> Option<V> {
        self.inner.get(&index)
    }

    pub fn delete(&self, index: u64) {
        self.inner.delete(&index);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Snapshot of every live value, in no particular guaranteed order (see
    /// `TtlMap::items`).
    #[must_use]
    pub fn get_all(&self) -> Vec<V> {
        let mut result = Vec::new();
        self.inner.items(|_, v| {
            result.push(v.clone());
            true
        });
        result
    }

    /// Delegates to the inner map's `range`, hiding the key from the consumer.
    pub fn range(&self, mut consumer: impl FnMut(&V) -> bool, offset: usize, limit: Option<usize>) {
        self.inner.range(|v| consumer(v), offset, limit);
    }

    /// Deletes every position whose value satisfies `pred`. `pred = None`
    /// deletes everything.
    pub fn delete_all(&self, pred: Option<impl Fn(&V) -> bool>) {
        match pred {
            Some(pred) => self.inner.delete_all(|v| pred(v)),
            None => self.inner.delete_all(|_| true),
        }
    }
}

impl<V> Default for TtlSeq<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc as StdArc;
    use std::thread;

    use super::*;

    #[test]
    fn append_assigns_increasing_keys() {
        let seq = TtlSeq::<&str>::new();
        let k1 = seq.append("a", None);
        let k2 = seq.append("b", None);
        assert!(k2 > k1);
    }

    #[test]
    fn get_returns_appended_value() {
        let seq = TtlSeq::<&str>::new();
        let k = seq.append("a", None);
        assert_eq!(seq.get(k), Some("a"));
    }

    #[test]
    fn delete_removes_position() {
        let seq = TtlSeq::<&str>::new();
        let k = seq.append("a", None);
        seq.delete(k);
        assert_eq!(seq.get(k), None);
    }

    #[test]
    fn get_all_snapshots_live_values() {
        let seq = TtlSeq::<i32>::new();
        seq.append(1, None);
        seq.append(2, None);
        seq.append(3, None);
        let mut all = seq.get_all();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3]);
    }

    #[test]
    fn delete_all_with_none_predicate_clears_everything() {
        let seq = TtlSeq::<i32>::new();
        seq.append(1, None);
        seq.append(2, None);
        seq.delete_all(None::<fn(&i32) -> bool>);
        assert_eq!(seq.len(), 0);
    }

    #[test]
    fn delete_all_with_predicate_removes_matches_only() {
        let seq = TtlSeq::<i32>::new();
        seq.append(1, None);
        seq.append(2, None);
        seq.append(3, None);
        seq.delete_all(Some(|v: &i32| *v % 2 == 0));
        let mut remaining = seq.get_all();
        remaining.sort_unstable();
        assert_eq!(remaining, vec![1, 3]);
    }

    /// No two successful concurrent appends observe the same position.
    #[test]
    fn concurrent_appends_never_collide() {
        let seq = StdArc::new(TtlSeq::<i32>::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seq = seq.clone();
                thread::spawn(move || {
                    let mut keys = Vec::with_capacity(100);
                    for i in 0..100 {
                        keys.push(seq.append(i, None));
                    }
                    keys
                })
            })
            .collect();

        let mut all_keys: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        let total = all_keys.len();
        all_keys.sort_unstable();
        all_keys.dedup();
        assert_eq!(all_keys.len(), total, "every appended key must be unique");
    }
}
