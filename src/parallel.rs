use std::time::Instant;

use tracing::{debug, info};

use crate::error::{CarpetError, Result};
use crate::grid::{Band, Grid, GridSpec, Square};
use crate::tiler;

/// Squares smaller than this are finished inside the task that reached them
/// instead of forking eight more.
pub const SEQUENTIAL_CUTOFF: usize = 27;

/// Fork-join strategy on a dedicated rayon pool of `num_threads` workers.
pub fn run(spec: GridSpec, num_threads: usize) -> Result<Grid> {
    run_with_cutoff(spec, num_threads, SEQUENTIAL_CUTOFF)
}

pub fn run_with_cutoff(spec: GridSpec, num_threads: usize, cutoff: usize) -> Result<Grid> {
    // rayon reads 0 threads as "pick for me", a caller asking for none is wrong
    if num_threads == 0 {
        return Err(CarpetError::Config("at least one thread is required".into()));
    }
    // a local pool rather than build_global, so runs with different thread
    // counts can share one process
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|index| format!("carpet-task-{index}"))
        .build()?;
    debug!(threads = pool.current_num_threads(), cutoff, "task pool ready");

    let mut grid = Grid::new(spec)?;
    let start_time = Instant::now();
    pool.install(|| {
        fill_forked(
            grid.band_mut(),
            Square::whole(spec.side()),
            spec.depth(),
            cutoff,
        )
    });
    info!(
        depth = spec.depth(),
        side = spec.side(),
        threads = num_threads,
        elapsed = ?start_time.elapsed(),
        "parallel carpet complete"
    );
    Ok(grid)
}

/// Fills `square`, which `band` must cover exactly, then forks one task per
/// non-centre block and joins them before returning.
///
/// Each child receives its own block of the band, so sibling tasks never
/// write the same cell.
pub fn fill_forked(mut band: Band<'_>, square: Square, depth: u32, cutoff: usize) {
    if depth == 0 {
        return;
    }
    // small squares are not worth a task each
    if square.size < cutoff {
        tiler::fill(&mut band, square, depth);
        return;
    }
    // this level's states first, children only refine their own blocks
    tiler::paint(&mut band, square);
    let block = square.size / 3;
    if block == 0 {
        return;
    }

    // nine disjoint views, the borrow checker sees no two tasks share a cell
    let blocks = band.split3(block);
    // scope returns only after all eight children have finished
    rayon::scope(|scope| {
        for (block_row, strip) in blocks.into_iter().enumerate() {
            for (block_col, child) in strip.into_iter().enumerate() {
                // centre block stays as painted
                if (block_row, block_col) == (1, 1) {
                    continue;
                }
                let child_square = square.child(block_row, block_col);
                scope.spawn(move |_| fill_forked(child, child_square, depth - 1, cutoff));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequential;

    #[test]
    fn fully_forked_matches_sequential() {
        for depth in 0..=4 {
            let spec = GridSpec::new(depth).unwrap();
            let forked = run_with_cutoff(spec, 4, 1).unwrap();
            assert_eq!(forked, sequential::run(spec).unwrap(), "depth {depth}");
        }
    }

    #[test]
    fn default_cutoff_matches_sequential() {
        let spec = GridSpec::new(5).unwrap();
        assert_eq!(run(spec, 3).unwrap(), sequential::run(spec).unwrap());
    }

    #[test]
    fn single_thread_pool_still_completes() {
        let spec = GridSpec::new(3).unwrap();
        assert_eq!(run_with_cutoff(spec, 1, 3).unwrap().count_present(), 512);
    }

    #[test]
    fn zero_threads_is_rejected() {
        let spec = GridSpec::new(1).unwrap();
        assert!(matches!(run(spec, 0), Err(CarpetError::Config(_))));
        assert!(matches!(
            run_with_cutoff(spec, 0, 1),
            Err(CarpetError::Config(_))
        ));
    }

    #[test]
    fn unallocatable_grid_is_reported() {
        let spec = GridSpec::new(19).unwrap();
        assert!(matches!(
            run(spec, 2),
            Err(CarpetError::Capacity { depth: 19 })
        ));
    }
}
