//! Fixed-size batching of ordered sequences.
//!
//! [`batchify`] borrows a slice whose length is known up front and yields
//! sub-slices lazily, without copying. [`batchify_iter`] accepts any
//! iterator and buffers up to one batch at a time, so it also works for
//! input whose length is unknown or unbounded.

use std::iter::FusedIterator;

use crate::error::{Error, Result};

/// Batch size used when the caller has no preference.
pub const DEFAULT_BATCH_SIZE: usize = 1;

fn check_batch_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::invalid_argument("batch size must be at least 1"));
    }
    Ok(())
}

/// Splits `items` into consecutive batches of `size` elements.
///
/// Every batch holds exactly `size` elements except possibly the last,
/// which holds the remainder. An empty slice yields no batches.
///
/// Returns [`Error::InvalidArgument`] when `size` is zero.
pub fn batchify<T>(items: &[T], size: usize) -> Result<Batches<'_, T>> {
    check_batch_size(size)?;
    Ok(Batches {
        items,
        size,
        cursor: 0,
        end: items.len(),
    })
}

/// Lazily yields sub-slices of a borrowed slice. Created by [`batchify`].
#[derive(Debug, Clone)]
pub struct Batches<'a, T> {
    items: &'a [T],
    size: usize,
    cursor: usize,
    end: usize,
}

impl<T> Batches<'_, T> {
    /// Returns the configured batch size.
    pub fn batch_size(&self) -> usize {
        self.size
    }
}

impl<'a, T> Iterator for Batches<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }
        let stop = (self.cursor + self.size).min(self.end);
        let batch = &self.items[self.cursor..stop];
        self.cursor = stop;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.cursor).div_ceil(self.size);
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for Batches<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.end {
            return None;
        }
        // The trailing batch is the short one, so its start is aligned to
        // the original stride rather than to `end - size`.
        let remainder = (self.end - self.cursor) % self.size;
        let start = if remainder == 0 {
            self.end - self.size
        } else {
            self.end - remainder
        };
        let batch = &self.items[start..self.end];
        self.end = start;
        Some(batch)
    }
}

impl<T> ExactSizeIterator for Batches<'_, T> {}

impl<T> FusedIterator for Batches<'_, T> {}

/// Groups the items of any iterator into owned batches of `size` elements.
///
/// Returns [`Error::InvalidArgument`] when `size` is zero.
pub fn batchify_iter<I>(iter: I, size: usize) -> Result<BufferedBatches<I::IntoIter>>
where
    I: IntoIterator,
{
    check_batch_size(size)?;
    Ok(BufferedBatches {
        inner: iter.into_iter(),
        size,
        done: false,
    })
}

/// Buffers items from an inner iterator into `Vec` batches. Created by
/// [`batchify_iter`].
#[derive(Debug, Clone)]
pub struct BufferedBatches<I> {
    inner: I,
    size: usize,
    done: bool,
}

impl<I: Iterator> Iterator for BufferedBatches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut batch = Vec::with_capacity(self.size);
        for item in self.inner.by_ref() {
            batch.push(item);
            if batch.len() == self.size {
                return Some(batch);
            }
        }
        self.done = true;
        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let (lower, upper) = self.inner.size_hint();
        (
            lower.div_ceil(self.size),
            upper.map(|upper| upper.div_ceil(self.size)),
        )
    }
}

impl<I: Iterator> FusedIterator for BufferedBatches<I> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batchify_with_remainder() {
        let items = ["a", "b", "c", "d", "e"];
        let batches: Vec<&[&str]> = batchify(&items, 2).unwrap().collect();
        assert_eq!(batches, vec![&["a", "b"][..], &["c", "d"][..], &["e"][..]]);
    }

    #[test]
    fn batchify_default_size_yields_singletons() {
        let items = [1, 2, 3];
        let batches: Vec<_> = batchify(&items, DEFAULT_BATCH_SIZE).unwrap().collect();
        assert_eq!(batches, vec![&[1][..], &[2][..], &[3][..]]);
    }

    #[test]
    fn batchify_empty_yields_nothing() {
        let items: [u8; 0] = [];
        assert_eq!(batchify(&items, 3).unwrap().count(), 0);
    }

    #[test]
    fn batchify_size_larger_than_input() {
        let items = [1, 2];
        let batches: Vec<_> = batchify(&items, 10).unwrap().collect();
        assert_eq!(batches, vec![&[1, 2][..]]);
    }

    #[test]
    fn batchify_zero_size_is_rejected() {
        let err = batchify(&[1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn batchify_reports_exact_len() {
        let items: Vec<u32> = (0..10).collect();
        let mut batches = batchify(&items, 3).unwrap();
        assert_eq!(batches.batch_size(), 3);
        assert_eq!(batches.len(), 4);
        batches.next();
        assert_eq!(batches.len(), 3);
    }

    #[test]
    fn batchify_reversed_matches_forward() {
        let items: Vec<u32> = (0..7).collect();
        let forward: Vec<_> = batchify(&items, 3).unwrap().collect();
        let mut backward: Vec<_> = batchify(&items, 3).unwrap().rev().collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn batchify_meets_in_the_middle() {
        let items: Vec<u32> = (0..7).collect();
        let mut batches = batchify(&items, 2).unwrap();
        assert_eq!(batches.next(), Some(&[0, 1][..]));
        assert_eq!(batches.next_back(), Some(&[6][..]));
        assert_eq!(batches.next_back(), Some(&[4, 5][..]));
        assert_eq!(batches.next(), Some(&[2, 3][..]));
        assert_eq!(batches.next(), None);
        assert_eq!(batches.next_back(), None);
    }

    #[test]
    fn batchify_iter_buffers_unsized_input() {
        let batches: Vec<Vec<char>> = batchify_iter("abcde".chars(), 2).unwrap().collect();
        assert_eq!(batches, vec![vec!['a', 'b'], vec!['c', 'd'], vec!['e']]);
    }

    #[test]
    fn batchify_iter_handles_unbounded_input() {
        let first: Vec<Vec<u64>> = batchify_iter(0.., 4).unwrap().take(2).collect();
        assert_eq!(first, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn batchify_iter_exact_multiple_has_no_empty_tail() {
        let batches: Vec<Vec<i32>> = batchify_iter(vec![1, 2, 3, 4], 2).unwrap().collect();
        assert_eq!(batches, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn batchify_iter_zero_size_is_rejected() {
        assert!(batchify_iter(Vec::<i32>::new(), 0).is_err());
    }

    // ── property tests ────────────────────────────────────────────

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn concatenation_reproduces_input(
                items in proptest::collection::vec(any::<i32>(), 0..200),
                size in 1usize..20,
            ) {
                let joined: Vec<i32> = batchify(&items, size)
                    .unwrap()
                    .flat_map(<[i32]>::iter)
                    .copied()
                    .collect();
                prop_assert_eq!(joined, items);
            }

            #[test]
            fn batch_lengths_and_count(
                items in proptest::collection::vec(any::<u8>(), 1..200),
                size in 1usize..20,
            ) {
                let batches: Vec<&[u8]> = batchify(&items, size).unwrap().collect();
                prop_assert_eq!(batches.len(), items.len().div_ceil(size));
                let (last, rest) = batches.split_last().unwrap();
                prop_assert!(rest.iter().all(|b| b.len() == size));
                prop_assert!(!last.is_empty() && last.len() <= size);
            }

            #[test]
            fn buffered_matches_slice_batches(
                items in proptest::collection::vec(any::<u16>(), 0..100),
                size in 1usize..12,
            ) {
                let from_slice: Vec<Vec<u16>> = batchify(&items, size)
                    .unwrap()
                    .map(<[u16]>::to_vec)
                    .collect();
                let buffered: Vec<Vec<u16>> = batchify_iter(items.iter().copied(), size)
                    .unwrap()
                    .collect();
                prop_assert_eq!(from_slice, buffered);
            }
        }
    }
}
