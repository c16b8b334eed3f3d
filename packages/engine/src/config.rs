//! Process-wide tunables for the engine's ambient machinery (reclaimer cadence,
//! pipeline worker sizing). Threaded explicitly through constructors rather
//! than read from global state, mirroring how the host's `ServerConfig` is
//! built once and passed down instead of read ad hoc from business logic.

/// Configuration for a [`crate::catalog::Catalog`] and the [`crate::reclaimer::Reclaimer`]
/// it spawns alongside it.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often the reclaimer sweeps every registered TTL map, in milliseconds.
    pub reclaim_interval_ms: u64,
    /// Below this many elements, the stream pipeline's sort stage falls back
    /// to a sequential sort instead of forking via `rayon::join`.
    pub parallel_sort_threshold: usize,
    /// Capacity of the bounded channels connecting the pipeline's filter and
    /// map stages.
    pub stream_channel_capacity: usize,
    /// Worker count for the pipeline's map stage. `0` means "derive from
    /// `std::thread::available_parallelism()` at pipeline construction time".
    pub map_worker_pool_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reclaim_interval_ms: 10_000,
            parallel_sort_threshold: 2048,
            stream_channel_capacity: 256,
            map_worker_pool_size: 0,
        }
    }
}
