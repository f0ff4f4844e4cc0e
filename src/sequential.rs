use std::time::Instant;

use tracing::info;

use crate::error::Result;
use crate::grid::{Grid, GridSpec, Square};
use crate::tiler;

/// Single-threaded baseline: one recursive fill over the whole grid.
///
/// This is the oracle the other strategies are checked against.
pub fn run(spec: GridSpec) -> Result<Grid> {
    let mut grid = Grid::new(spec)?;
    let start_time = Instant::now();
    tiler::fill(&mut grid.band_mut(), Square::whole(spec.side()), spec.depth());
    info!(
        depth = spec.depth(),
        side = spec.side(),
        elapsed = ?start_time.elapsed(),
        "sequential carpet complete"
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CarpetError;

    #[test]
    fn self_similar_counts() {
        for depth in 0..=5 {
            let grid = run(GridSpec::new(depth).unwrap()).unwrap();
            assert_eq!(grid.count_present(), 8usize.pow(depth), "depth {depth}");
        }
    }

    #[test]
    fn unallocatable_grid_is_reported() {
        let spec = GridSpec::new(19).unwrap();
        assert!(matches!(run(spec), Err(CarpetError::Capacity { depth: 19 })));
    }
}
