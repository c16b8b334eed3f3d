//! The capability the stream pipeline requires of a data source: produce
//! items with offset/limit pushed down to the source, without runtime type
//! inspection of who is implementing it.

use std::sync::Arc;

use crate::ttl::TtlSeq;

/// A source the [`super::Pipeline`] can draw items from. `range` must honor
/// `offset`/`limit` at the source -- this is what lets `Limit`/`Offset` avoid
/// materializing more than necessary.
pub trait Provider<T>: Send + Sync {
    fn range(&self, consumer: &mut dyn FnMut(T) -> bool, offset: usize, limit: Option<usize>);
}

/// A trivial array-backed provider, used to wrap the deduplicated candidate
/// set the table engine's query path produces before handing it to the
/// pipeline.
pub struct SliceProvider<T> {
    data: Vec<T>,
}

impl<T> SliceProvider<T> {
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> Provider<T> for SliceProvider<T>
where
    T: Clone + Send + Sync,
{
    fn range(&self, consumer: &mut dyn FnMut(T) -> bool, offset: usize, limit: Option<usize>) {
        let mut yielded = 0usize;
        for item in self.data.iter().skip(offset) {
            if let Some(limit) = limit {
                if yielded >= limit {
                    break;
                }
            }
            yielded += 1;
            if !consumer(item.clone()) {
                break;
            }
        }
    }
}

impl<T> Provider<T> for TtlSeq<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn range(&self, consumer: &mut dyn FnMut(T) -> bool, offset: usize, limit: Option<usize>) {
        TtlSeq::range(self, |v| consumer(v.clone()), offset, limit);
    }
}

impl<T> Provider<T> for Arc<TtlSeq<T>>
where
    T: Clone + Send + Sync + 'static,
{
    fn range(&self, consumer: &mut dyn FnMut(T) -> bool, offset: usize, limit: Option<usize>) {
        TtlSeq::range(self, |v| consumer(v.clone()), offset, limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_provider_pushes_down_offset_and_limit() {
        let provider = SliceProvider::new((0..10).collect::<Vec<i32>>());
        let mut seen = Vec::new();
        provider.range(
            &mut |v| {
                seen.push(v);
                true
            },
            3,
            Some(4),
        );
        assert_eq!(seen, vec![3, 4, 5, 6]);
    }

    #[test]
    fn slice_provider_consumer_can_stop_early() {
        let provider = SliceProvider::new((0..10).collect::<Vec<i32>>());
        let mut seen = 0;
        provider.range(
            &mut |_| {
                seen += 1;
                seen < 2
            },
            0,
            None,
        );
        assert_eq!(seen, 2);
    }
}
