//! The background reclaimer: a single process-wide task that sweeps every
//! registered [`crate::ttl::TtlMap`] on a fixed cadence.
//!
//! Grounded in the source's `StartGlobalCleaner`, which spawns one goroutine
//! ticking every 10 seconds over the CAS-registered map slice. Here the tick
//! loop is a `tokio::time::interval`, matching the async-task idiom the host
//! process already uses for its own periodic background work.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::config::EngineConfig;
use crate::ttl::registered_maps;

/// Handle to the spawned reclaimer task. Dropping this handle does not stop
/// the task -- the reclaimer is meant to run for the lifetime of the process,
/// matching the source's fire-and-forget goroutine. Call [`Reclaimer::abort`]
/// to stop it explicitly (mainly useful in tests).
pub struct Reclaimer {
    handle: JoinHandle<()>,
}

impl Reclaimer {
    /// Spawns the reclaimer's tick loop on the current Tokio runtime.
    ///
    /// Per tick: snapshot the registry, then sweep each map in turn. A
    /// panicking sweep (an "error or unexpected entry shape" in the
    /// specification's words) is caught and logged; it does not stop the
    /// sweep of the other registered maps in the same tick.
    #[must_use]
    pub fn spawn(config: &EngineConfig) -> Self {
        let interval = Duration::from_millis(config.reclaim_interval_ms);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the first real
            // sweep happens one full interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                sweep_once();
            }
        });
        Self { handle }
    }

    /// Stops the background task. Intended for tests; production processes
    /// let the reclaimer run until the process exits.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Performs exactly one sweep pass over every currently-registered map.
/// Exposed standalone (in addition to the spawned loop) so tests can force a
/// deterministic sweep without waiting for a tick.
pub fn sweep_once() {
    let now = Instant::now();
    let maps = registered_maps();
    let mut total_reclaimed = 0usize;
    for map in maps.iter() {
        let map = map.clone();
        let result = catch_unwind(AssertUnwindSafe(|| map.sweep_expired(now)));
        match result {
            Ok(reclaimed) => total_reclaimed += reclaimed,
            Err(_) => {
                tracing::warn!("reclaimer: a TTL map's sweep panicked; skipping it this tick");
            }
        }
    }
    tracing::trace!(maps = maps.len(), reclaimed = total_reclaimed, "reclaimer tick complete");
}
