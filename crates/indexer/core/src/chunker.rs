use kona_indexer_types::ChunkRange;
use std::{iter::FusedIterator, num::NonZeroU64};

/// Splits the inclusive range `[start, end]` into ascending chunks of at most `max_size` blocks.
///
/// The returned iterator is lazy and can be cloned to restart from its current position. An
/// empty range (`end < start`) yields no chunks.
pub fn chunk_range(start: u64, end: u64, max_size: NonZeroU64) -> ChunkIter {
    ChunkIter { next: (start <= end).then_some(start), end, max_size }
}

/// Iterator returned by [`chunk_range`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkIter {
    /// First block of the next chunk, `None` once the range is exhausted.
    next: Option<u64>,
    end: u64,
    max_size: NonZeroU64,
}

impl Iterator for ChunkIter {
    type Item = ChunkRange;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next?;
        let chunk_end = start.saturating_add(self.max_size.get() - 1).min(self.end);
        self.next = (chunk_end < self.end).then(|| chunk_end + 1);
        Some(ChunkRange::new(start, chunk_end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next.map_or(0, |start| {
            let blocks = u128::from(self.end - start) + 1;
            blocks.div_ceil(u128::from(self.max_size.get()))
        });
        match usize::try_from(remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for ChunkIter {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn size(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn pairs(iter: ChunkIter) -> Vec<(u64, u64)> {
        iter.map(|c| (c.start, c.end)).collect()
    }

    #[rstest]
    #[case(100, 105, 2, vec![(100, 101), (102, 103), (104, 105)])]
    #[case(100, 104, 2, vec![(100, 101), (102, 103), (104, 104)])]
    #[case(7, 7, 10, vec![(7, 7)])]
    #[case(0, 9, 10, vec![(0, 9)])]
    #[case(0, 9, 1, (0..=9).map(|b| (b, b)).collect())]
    #[case(10, 9, 3, vec![])]
    fn test_chunk_range(
        #[case] start: u64,
        #[case] end: u64,
        #[case] max: u64,
        #[case] expected: Vec<(u64, u64)>,
    ) {
        let iter = chunk_range(start, end, size(max));
        assert_eq!(iter.size_hint(), (expected.len(), Some(expected.len())));
        assert_eq!(pairs(iter), expected);
    }

    #[test]
    fn test_chunk_range_ends_at_u64_max() {
        let chunks = pairs(chunk_range(u64::MAX - 4, u64::MAX, size(2)));
        assert_eq!(chunks, vec![(u64::MAX - 4, u64::MAX - 3), (u64::MAX - 2, u64::MAX - 1), (
            u64::MAX,
            u64::MAX
        )]);

        let single = pairs(chunk_range(u64::MAX - 1, u64::MAX, size(u64::MAX)));
        assert_eq!(single, vec![(u64::MAX - 1, u64::MAX)]);
    }

    #[test]
    fn test_chunk_iter_restarts_from_clone() {
        let mut iter = chunk_range(0, 9, size(4));
        assert_eq!(iter.next().map(|c| c.start), Some(0));

        let restarted = iter.clone();
        assert_eq!(pairs(iter), pairs(restarted));
    }

    #[test]
    fn test_chunk_iter_is_fused() {
        let mut iter = chunk_range(0, 0, size(1));
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    proptest! {
        #[test]
        fn prop_chunks_cover_range_exactly(
            start in 0u64..1_000_000,
            len in 0u64..10_000,
            max in 1u64..500,
        ) {
            let end = start + len;
            let chunks: Vec<_> = chunk_range(start, end, size(max)).collect();

            prop_assert_eq!(chunks.first().map(|c| c.start), Some(start));
            prop_assert_eq!(chunks.last().map(|c| c.end), Some(end));
            for chunk in &chunks {
                prop_assert!(chunk.start <= chunk.end);
                prop_assert!(chunk.len() <= max);
            }
            for pair in chunks.windows(2) {
                prop_assert_eq!(pair[0].end + 1, pair[1].start);
            }
        }

        #[test]
        fn prop_size_hint_is_exact(start in 0u64..1_000, len in 0u64..1_000, max in 1u64..50) {
            let iter = chunk_range(start, start + len, size(max));
            let (lower, upper) = iter.size_hint();
            let count = iter.count();
            prop_assert_eq!(lower, count);
            prop_assert_eq!(upper, Some(count));
        }
    }
}
