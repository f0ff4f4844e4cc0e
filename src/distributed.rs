//! Message-passing strategy: isolated ranks, one broadcast, one gather.
//!
//! ```text
//! Init -> ConfigBroadcast -> LocalCompute -> Gather -> Finalize
//! ```
//!
//! Every rank fills a private buffer holding only its own rows; the
//! coordinator is the only place partial results meet.

use std::time::Instant;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::comm::{self, Endpoint};
use crate::error::{CarpetError, Result};
use crate::grid::{allocate_cells, Band, Grid, GridSpec, Square};
use crate::partition::{partition, RowRange};
use crate::tiler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    ConfigBroadcast,
    LocalCompute,
    Gather,
    Finalize,
}

/// A rank's computed rows, handed to the coordinator.
#[derive(Debug)]
pub struct Slice {
    pub range: RowRange,
    pub cells: Array2<u8>,
}

type RankEndpoint = Endpoint<GridSpec, Slice>;

pub fn run(spec: GridSpec, workers: usize) -> Result<Grid> {
    if workers == 0 {
        return Err(CarpetError::Config("at least one worker is required".into()));
    }
    if workers > spec.side() {
        warn!(
            workers,
            side = spec.side(),
            "more workers than rows, trailing ranks get empty ranges"
        );
    }
    debug!(rank = comm::COORDINATOR, phase = ?Phase::Init, "entering phase");
    let start_time = Instant::now();
    let grid = comm::launch(workers, spec, rank_main)?;
    info!(
        depth = spec.depth(),
        side = spec.side(),
        workers,
        elapsed = ?start_time.elapsed(),
        "distributed carpet complete"
    );
    Ok(grid)
}

fn rank_main(endpoint: RankEndpoint, config: Option<GridSpec>) -> Result<Option<Grid>> {
    let rank = endpoint.rank();

    // coordinator reserves the global grid before the broadcast, so a grid
    // that does not fit fails here and no rank starts computing
    let global = match config {
        Some(spec) => Some(Grid::new(spec)?),
        None => None,
    };

    enter(rank, Phase::ConfigBroadcast);
    // workers block here until rank 0 sends the configuration
    let spec = endpoint.broadcast(config)?;

    enter(rank, Phase::LocalCompute);
    // each rank fills only its own block of rows
    let range = partition(spec.side(), endpoint.size(), rank);
    debug!(rank, start = range.start, end = range.end, "row range assigned");
    let cells = compute_rows(spec, range)?;

    enter(rank, Phase::Gather);
    // the local buffer moves to the coordinator, nothing is shared
    let Some(slices) = endpoint.gather(Slice { range, cells })? else {
        return Ok(None);
    };

    enter(rank, Phase::Finalize);
    let mut grid = match global {
        Some(grid) => grid,
        None => Grid::new(spec)?,
    };
    // slices land at their own row offset, arrival order does not matter
    for slice in &slices {
        grid.write_rows(slice.range, &slice.cells);
    }
    Ok(Some(grid))
}

/// Fills a fresh `range.len() x side` buffer with the rows in `range`.
///
/// The buffer is reserved fallibly before the fill starts.
pub fn compute_rows(spec: GridSpec, range: RowRange) -> Result<Array2<u8>> {
    let mut cells = allocate_cells(spec.depth(), range.len(), spec.side())?;
    // band carries the global row offset, tiler works in grid coordinates
    let mut band = Band::new(cells.view_mut(), range.start, 0, spec.side());
    tiler::fill(&mut band, Square::whole(spec.side()), spec.depth());
    Ok(cells)
}

fn enter(rank: usize, phase: Phase) {
    debug!(rank, ?phase, "entering phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential;

    #[test]
    fn matches_sequential_for_various_worker_counts() {
        let spec = GridSpec::new(3).unwrap();
        let baseline = sequential::run(spec).unwrap();
        for workers in [1, 2, 4, 7, 27] {
            assert_eq!(run(spec, workers).unwrap(), baseline, "{workers} workers");
        }
    }

    #[test]
    fn surplus_workers_contribute_nothing() {
        let spec = GridSpec::new(1).unwrap();
        let grid = run(spec, 10).unwrap();
        assert_eq!(grid.to_row_major(), vec![1, 1, 1, 1, 0, 1, 1, 1, 1]);
        assert_eq!(compute_rows(spec, partition(3, 10, 5)).unwrap().dim(), (0, 3));
    }

    #[test]
    fn unallocatable_grid_fails_before_ranks_compute() {
        let spec = GridSpec::new(19).unwrap();
        assert!(matches!(
            run(spec, 2),
            Err(CarpetError::Capacity { depth: 19 })
        ));
        // one rank's share of a depth-19 grid is still out of reach
        let range = partition(spec.side(), 2, 1);
        assert!(matches!(
            compute_rows(spec, range),
            Err(CarpetError::Capacity { depth: 19 })
        ));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let spec = GridSpec::new(1).unwrap();
        assert!(matches!(run(spec, 0), Err(CarpetError::Config(_))));
    }
}
