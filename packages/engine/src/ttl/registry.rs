//! Process-wide, lock-free registry of every live [`TtlMap`](super::TtlMap)
//! instance, swept by the [`crate::reclaimer::Reclaimer`].
//!
//! Registration never shrinks (no deregistration): the set of `TtlMap`
//! instances ever created is bounded by the catalog (tables/databases are
//! never dropped), so the append-only growth is an accepted, documented
//! tradeoff rather than an oversight.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use arc_swap::ArcSwap;

/// A type-erased capability for sweeping expired entries out of a TTL-backed
/// container. Implemented by `TtlMap<K, V>` for any `K, V` so the registry
/// can hold heterogeneous map instances behind one vtable.
pub trait Sweepable: Send + Sync {
    /// Removes every entry whose expiry has passed as of `now`. Returns the
    /// number of entries removed.
    fn sweep_expired(&self, now: Instant) -> usize;
}

fn registry() -> &'static ArcSwap<Vec<Arc<dyn Sweepable>>> {
    static REGISTRY: OnceLock<ArcSwap<Vec<Arc<dyn Sweepable>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| ArcSwap::from_pointee(Vec::new()))
}

/// Registers `map` with the global reclaimer registry via CAS-retry, exactly
/// the way every `TtlMap` does on construction.
pub fn register(map: Arc<dyn Sweepable>) {
    registry().rcu(move |current| {
        let mut next = (**current).clone();
        next.push(map.clone());
        next
    });
}

/// Snapshot of every currently registered map, taken once at the start of a
/// reclaimer sweep tick. Maps registered after the snapshot is taken are
/// visited on the following tick.
#[must_use]
pub fn registered_maps() -> Arc<Vec<Arc<dyn Sweepable>>> {
    registry().load_full()
}
