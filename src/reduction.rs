//! Distributed array sum: contiguous chunks per rank, partial sums combined
//! at the coordinator.

use std::time::Instant;

use tracing::{debug, info};

use crate::comm::{self, checked_total, Endpoint};
use crate::error::Result;
use crate::partition::partition;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumReport {
    /// One partial sum per rank, in rank order.
    pub partials: Vec<i64>,
    pub total: i64,
}

/// Sums `values` across `workers` ranks and reports each rank's partial.
pub fn sum(values: &[i64], workers: usize) -> Result<SumReport> {
    let start_time = Instant::now();
    let partials = comm::launch(workers, values.to_vec(), |endpoint, input| {
        let partial = local_sum(&endpoint, input)?;
        endpoint.gather(partial)
    })?;
    for (rank, partial) in partials.iter().enumerate() {
        debug!(rank, partial, "partial sum");
    }
    // one pass in rank order
    let total = checked_total(partials.iter().copied())?;
    info!(
        len = values.len(),
        workers,
        total,
        elapsed = ?start_time.elapsed(),
        "distributed sum complete"
    );
    Ok(SumReport { partials, total })
}

/// Same distribution as [`sum`], combined with a single reduce-to-one.
pub fn total(values: &[i64], workers: usize) -> Result<i64> {
    comm::launch(workers, values.to_vec(), |endpoint, input| {
        let partial = local_sum(&endpoint, input)?;
        endpoint.reduce_sum(partial)
    })
}

/// Single-threaded baseline.
pub fn sequential_sum(values: &[i64]) -> Result<i64> {
    checked_total(values.iter().copied())
}

fn local_sum(endpoint: &Endpoint<Vec<i64>, i64>, input: Option<Vec<i64>>) -> Result<i64> {
    let values = endpoint.broadcast(input)?;
    let chunk = partition(values.len(), endpoint.size(), endpoint.rank());
    checked_total(values[chunk.as_range()].iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CarpetError;

    #[test]
    fn one_to_ten_over_three_workers() {
        let values: Vec<i64> = (1..=10).collect();
        let report = sum(&values, 3).unwrap();
        assert_eq!(report.partials, vec![10, 26, 19]);
        assert_eq!(report.total, 55);
        assert_eq!(total(&values, 3).unwrap(), 55);
    }

    #[test]
    fn empty_array_sums_to_zero() {
        let report = sum(&[], 4).unwrap();
        assert_eq!(report.partials, vec![0, 0, 0, 0]);
        assert_eq!(report.total, 0);
    }

    #[test]
    fn overflow_is_reported() {
        let values = [i64::MAX, 1];
        assert!(matches!(sum(&values, 2), Err(CarpetError::SumOverflow)));
        assert!(matches!(total(&values, 2), Err(CarpetError::SumOverflow)));
        assert!(matches!(sequential_sum(&values), Err(CarpetError::SumOverflow)));
    }

    #[test]
    fn negative_values_cancel() {
        assert_eq!(total(&[-5, 5, -3, 3, 7], 2).unwrap(), 7);
    }
}
