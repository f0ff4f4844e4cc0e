//! Row-block partitioning of a square grid (or a 1-D array) across workers.

use std::ops::Range;

/// Half-open interval `[start, end)` of rows owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, row: usize) -> bool {
        self.start <= row && row < self.end
    }

    /// Intersection with another half-open interval, empty when disjoint.
    pub fn intersect(&self, start: usize, end: usize) -> Range<usize> {
        let lo = self.start.max(start);
        let hi = self.end.min(end);
        lo..hi.max(lo)
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Rows owned by `worker_index` when `side` rows are split across
/// `worker_count` workers in contiguous blocks of `ceil(side / worker_count)`.
///
/// The last non-empty block may be shorter. Workers whose block would start
/// past the end receive the empty range `[side, side)`, which happens when
/// `worker_count > side`.
///
/// # Panics
///
/// Panics if `worker_count == 0` or `worker_index >= worker_count`.
pub fn partition(side: usize, worker_count: usize, worker_index: usize) -> RowRange {
    assert!(worker_count > 0, "worker count must be positive");
    assert!(
        worker_index < worker_count,
        "worker index {worker_index} out of bounds for {worker_count} workers"
    );
    let rows_per_worker = side.div_ceil(worker_count);
    let start = (worker_index * rows_per_worker).min(side);
    let end = (start + rows_per_worker).min(side);
    RowRange::new(start, end)
}

/// All row ranges in worker-index order.
pub fn partitions(side: usize, worker_count: usize) -> impl Iterator<Item = RowRange> {
    (0..worker_count).map(move |index| partition(side, worker_count, index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_rows_three_workers() {
        let ranges: Vec<_> = partitions(10, 3).collect();
        assert_eq!(
            ranges,
            vec![RowRange::new(0, 4), RowRange::new(4, 8), RowRange::new(8, 10)]
        );
    }

    #[test]
    fn more_workers_than_rows_yields_empty_tail() {
        let ranges: Vec<_> = partitions(3, 10).collect();
        assert_eq!(ranges[0], RowRange::new(0, 1));
        assert_eq!(ranges[2], RowRange::new(2, 3));
        for range in &ranges[3..] {
            assert!(range.is_empty());
            assert_eq!(range.start, 3);
        }
    }

    #[test]
    fn single_worker_owns_everything() {
        assert_eq!(partition(27, 1, 0), RowRange::new(0, 27));
    }

    #[test]
    fn intersect_clamps_to_empty() {
        let range = RowRange::new(3, 6);
        assert_eq!(range.intersect(0, 9), 3..6);
        assert_eq!(range.intersect(5, 9), 5..6);
        assert!(range.intersect(6, 9).is_empty());
        assert!(range.intersect(0, 2).is_empty());
    }

    #[test]
    #[should_panic(expected = "worker count must be positive")]
    fn zero_workers_panics() {
        partition(9, 0, 0);
    }
}
