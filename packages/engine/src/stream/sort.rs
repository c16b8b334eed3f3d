//! Parallel quicksort: median-of-three pivot, Lomuto partition, fork/join
//! recursion via `rayon::join`, sequential fallback below a size threshold.
//!
//! Grounded in the source's `parallelQuickSort`, translated from goroutine
//! fan-out + `sync.WaitGroup` to `rayon::join`'s structured fork/join, which
//! gives the same "two independent halves in parallel, join before
//! returning" shape without hand-rolled thread spawning.

use std::cmp::Ordering;

pub fn parallel_quick_sort<T, F>(data: &mut [T], cmp: &F, threshold: usize)
where
    T: Send,
    F: Fn(&T, &T) -> Ordering + Sync,
{
    let len = data.len();
    if len < 2 {
        return;
    }
    if len < threshold {
        data.sort_by(|a, b| cmp(a, b));
        return;
    }

    let mid = len / 2;
    let last = len - 1;
    if cmp(&data[mid], &data[0]) == Ordering::Less {
        data.swap(0, mid);
    }
    if cmp(&data[last], &data[0]) == Ordering::Less {
        data.swap(0, last);
    }
    if cmp(&data[mid], &data[last]) == Ordering::Less {
        data.swap(mid, last);
    }

    let mut pivot_index = 0;
    for j in 0..last {
        if cmp(&data[j], &data[last]) == Ordering::Less {
            data.swap(pivot_index, j);
            pivot_index += 1;
        }
    }
    data.swap(pivot_index, last);

    let (left, rest) = data.split_at_mut(pivot_index);
    let right = &mut rest[1..];
    rayon::join(
        || parallel_quick_sort(left, cmp, threshold),
        || parallel_quick_sort(right, cmp, threshold),
    );
}
