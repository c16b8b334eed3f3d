//! The lazy filter/map/sort/paginate builder (`Pipeline::collect`).
//!
//! Grounded in the source's `Stream[T]`/`Collect()`, re-architected so that
//! filters, maps, and the order comparator are distinct builder fields
//! instead of one untyped `ops []interface{}` slot distinguished by a
//! runtime type switch.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::stream::provider::Provider;
use crate::stream::sort::parallel_quick_sort;

type FilterFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type MapFn<T> = Box<dyn Fn(T) -> T + Send + Sync>;
type OrderFn<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A builder over any [`Provider<T>`]. Every combinator returns `self` to
/// support fluent chaining; nothing executes until [`Pipeline::collect`].
pub struct Pipeline<T> {
    provider: Arc<dyn Provider<T>>,
    filters: Vec<FilterFn<T>>,
    maps: Vec<MapFn<T>>,
    order: Option<OrderFn<T>>,
    limit: Option<usize>,
    offset: usize,
}

impl<T> Pipeline<T>
where
    T: Send + 'static,
{
    #[must_use]
    pub fn new(provider: Arc<dyn Provider<T>>) -> Self {
        Self {
            provider,
            filters: Vec::new(),
            maps: Vec::new(),
            order: None,
            limit: None,
            offset: 0,
        }
    }

    #[must_use]
    pub fn filter(mut self, pred: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.filters.push(Box::new(pred));
        self
    }

    #[must_use]
    pub fn map(mut self, f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.maps.push(Box::new(f));
        self
    }

    #[must_use]
    pub fn order(mut self, cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.order = Some(Box::new(cmp));
        self
    }

    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n as usize);
        self
    }

    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = n as usize;
        self
    }

    /// Executes the pipeline: source stage (provider range + filters) feeds a
    /// bounded channel; a worker pool drains it applying the map chain onto a
    /// second bounded channel; the caller drains that into a `Vec`; finally,
    /// if an order comparator was registered, the materialized sequence is
    /// sorted in place via parallel quicksort.
    ///
    /// `Limit`/`Offset` were already pushed to the provider in the source
    /// stage and are not reapplied after sorting -- a row's position in the
    /// final, sorted order is not what bounded the candidate set.
    #[must_use]
    pub fn collect(self, config: &EngineConfig) -> Vec<T> {
        let Pipeline {
            provider,
            filters,
            maps,
            order,
            limit,
            offset,
        } = self;

        let capacity = config.stream_channel_capacity.max(1);
        let (filtered_tx, filtered_rx) = crossbeam_channel::bounded::<T>(capacity);
        let filters = Arc::new(filters);

        let source_filters = filters.clone();
        let source_handle = std::thread::spawn(move || {
            provider.range(
                &mut |item: T| {
                    if source_filters.iter().all(|f| f(&item)) {
                        filtered_tx.send(item).is_ok()
                    } else {
                        true
                    }
                },
                offset,
                limit,
            );
        });

        let worker_count = if config.map_worker_pool_size == 0 {
            std::thread::available_parallelism().map(std::num::NonZeroUsize::get).unwrap_or(1)
        } else {
            config.map_worker_pool_size
        };

        let (mapped_tx, mapped_rx) = crossbeam_channel::bounded::<T>(capacity);
        let maps = Arc::new(maps);
        let mut worker_handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let rx = filtered_rx.clone();
            let tx = mapped_tx.clone();
            let maps = maps.clone();
            worker_handles.push(std::thread::spawn(move || {
                while let Ok(item) = rx.recv() {
                    let mapped = maps.iter().fold(item, |acc, f| f(acc));
                    if tx.send(mapped).is_err() {
                        break;
                    }
                }
            }));
        }
        // Drop our own sender so the channel closes once every worker (which
        // holds a clone) finishes draining the filter stage.
        drop(mapped_tx);
        drop(filtered_rx);

        let mut result: Vec<T> = mapped_rx.into_iter().collect();

        let _ = source_handle.join();
        for handle in worker_handles {
            let _ = handle.join();
        }

        if let Some(cmp) = order {
            parallel_quick_sort(&mut result, &*cmp, config.parallel_sort_threshold);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::provider::SliceProvider;

    fn pipeline_over(data: Vec<i32>) -> Pipeline<i32> {
        Pipeline::new(Arc::new(SliceProvider::new(data)))
    }

    #[test]
    fn filter_runs_before_map() {
        let config = EngineConfig::default();
        let mut result = pipeline_over((0..10).collect())
            .filter(|v| v % 2 == 0)
            .map(|v| v * 10)
            .collect(&config);
        result.sort_unstable();
        assert_eq!(result, vec![0, 20, 40, 60, 80]);
    }

    #[test]
    fn order_sorts_after_materialization() {
        let config = EngineConfig::default();
        let result = pipeline_over(vec![5, 3, 1, 4, 2])
            .order(|a, b| a.cmp(b))
            .collect(&config);
        assert_eq!(result, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn without_order_map_stage_may_reorder_but_preserves_set() {
        let config = EngineConfig::default();
        let mut result = pipeline_over((0..50).collect()).map(|v| v + 1).collect(&config);
        result.sort_unstable();
        assert_eq!(result, (1..=50).collect::<Vec<i32>>());
    }

    #[test]
    fn limit_and_offset_are_pushed_to_the_provider() {
        let config = EngineConfig::default();
        let result = pipeline_over((0..10).collect()).offset(2).limit(3).collect(&config);
        assert_eq!(result, vec![2, 3, 4]);
    }

    #[test]
    fn limit_after_sort_is_not_reapplied() {
        // Limit bounds the candidate set pulled from the source, not the
        // final sorted output -- so limiting to 3 items from an unsorted
        // source and then sorting returns those same 3 items, sorted.
        let config = EngineConfig::default();
        let result = pipeline_over(vec![9, 8, 7, 1, 2, 3])
            .limit(3)
            .order(|a, b| a.cmp(b))
            .collect(&config);
        assert_eq!(result, vec![7, 8, 9]);
    }

    #[test]
    fn empty_provider_yields_empty_result() {
        let config = EngineConfig::default();
        let result: Vec<i32> = pipeline_over(vec![]).collect(&config);
        assert!(result.is_empty());
    }
}
