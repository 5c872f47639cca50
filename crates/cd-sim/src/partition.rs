//! Balanced contiguous partitions of the disk pool.

use std::ops::Range;

use crate::error::{SimError, SimResult};

/// Split `0..n` into `workers` contiguous ranges.
///
/// The first `n % workers` ranges hold `n / workers + 1` items, the rest
/// `n / workers`. Ranges may be empty when `n < workers`.
pub fn partition_bounds(n: usize, workers: usize) -> SimResult<Vec<Range<usize>>> {
    if workers == 0 {
        return Err(SimError::InvalidArg {
            what: "worker count must be at least 1",
        });
    }
    let base = n / workers;
    let extra = n % workers;
    let mut start = 0;
    Ok((0..workers)
        .map(|w| {
            let len = base + usize::from(w < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect())
}

pub fn partition<T>(items: &[T], workers: usize) -> SimResult<Vec<&[T]>> {
    Ok(partition_bounds(items.len(), workers)?
        .into_iter()
        .map(|r| &items[r])
        .collect())
}

/// Mutable version of [`partition`]; the slices are disjoint.
pub fn partition_mut<T>(items: &mut [T], workers: usize) -> SimResult<Vec<&mut [T]>> {
    let bounds = partition_bounds(items.len(), workers)?;
    let mut parts = Vec::with_capacity(bounds.len());
    let mut rest = items;
    for range in bounds {
        let (head, tail) = rest.split_at_mut(range.len());
        parts.push(head);
        rest = tail;
    }
    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn larger_shares_go_first() {
        let sizes: Vec<usize> = partition_bounds(10, 4)
            .unwrap()
            .iter()
            .map(|r| r.len())
            .collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(matches!(
            partition_bounds(3, 0),
            Err(SimError::InvalidArg { .. })
        ));
    }

    #[test]
    fn fewer_items_than_workers() {
        let items = [1, 2];
        let parts = partition(&items, 4).unwrap();
        assert_eq!(parts, vec![&[1][..], &[2][..], &[][..], &[][..]]);
    }

    proptest! {
        #[test]
        fn partitions_rebuild_the_input(n in 0usize..300, workers in 1usize..17) {
            let items: Vec<usize> = (0..n).collect();
            let parts = partition(&items, workers).unwrap();
            prop_assert_eq!(parts.len(), workers);
            let joined: Vec<usize> = parts.iter().flat_map(|p| p.iter().copied()).collect();
            prop_assert_eq!(joined, items.clone());
            let max = parts.iter().map(|p| p.len()).max().unwrap_or(0);
            let min = parts.iter().map(|p| p.len()).min().unwrap_or(0);
            prop_assert!(max - min <= 1);
        }

        #[test]
        fn mutable_partitions_match_shared(n in 0usize..100, workers in 1usize..9) {
            let mut items: Vec<usize> = (0..n).collect();
            let shared: Vec<Vec<usize>> = partition(&items, workers)
                .unwrap()
                .iter()
                .map(|p| p.to_vec())
                .collect();
            let mutable: Vec<Vec<usize>> = partition_mut(&mut items, workers)
                .unwrap()
                .iter()
                .map(|p| p.to_vec())
                .collect();
            prop_assert_eq!(shared, mutable);
        }
    }
}
