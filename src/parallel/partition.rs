//! Splitting a sequence into contiguous, non-overlapping index ranges.

use std::ops::Range;

/// A half-open index range `[low, high)` over a source sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Partition {
    /// Ordinal of the partition, starting at 0.
    pub index: usize,
    pub low: usize,
    pub high: usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.high - self.low
    }

    pub fn is_empty(&self) -> bool {
        self.low == self.high
    }

    pub fn range(&self) -> Range<usize> {
        self.low..self.high
    }
}

/// Chunk length used by [`by_count`]: `floor(len / count) + 1`.
pub fn chunk_size(len: usize, count: usize) -> usize {
    len / count.max(1) + 1
}

/// Divides `len` elements into exactly `count` partitions.
///
/// A `count` of 0 is treated as 1. Trailing partitions are empty when the
/// chunk length overshoots `len`; workers skip them without error.
pub fn by_count(len: usize, count: usize) -> Vec<Partition> {
    let count = count.max(1);
    let chunk = chunk_size(len, count);

    (0..count)
        .map(|index| Partition {
            index,
            low: (index * chunk).min(len),
            high: ((index + 1) * chunk).min(len),
        })
        .collect()
}

/// Divides `len` elements into `ceil(len / size)` partitions of `size`
/// elements, the last one truncated. A `size` of 0 is treated as 1.
pub fn by_size(len: usize, size: usize) -> Vec<Partition> {
    let size = size.max(1);

    (0..len.div_ceil(size))
        .map(|index| Partition {
            index,
            low: index * size,
            high: ((index + 1) * size).min(len),
        })
        .collect()
}
