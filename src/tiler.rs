//! Recursive carpet tiling over a band of rows.

use crate::grid::{Band, Square, ABSENT, PRESENT};
use crate::membership::is_in_carpet;

/// Fills `square` and its eight non-centre descendants down to `depth`,
/// touching only the rows `band` owns.
///
/// Every written state depends on nothing but the cell's own coordinates and
/// the grid side, so repeated or reordered writes leave the same bytes.
pub fn fill(band: &mut Band<'_>, square: Square, depth: u32) {
    // depth 0 leaves the present-by-default buffer as it is
    if depth == 0 {
        return;
    }
    // descendants lie inside the square, so a miss here prunes the subtree
    if !paint(band, square) {
        return;
    }
    // a side-1 square has no blocks left to subdivide
    if square.size / 3 > 0 {
        // centre block keeps the absent state paint just wrote
        for child in square.children() {
            fill(band, child, depth - 1);
        }
    }
}

/// Writes membership states for the cells of `square` inside the band.
/// Returns false when the square shares no rows with the band.
pub fn paint(band: &mut Band<'_>, square: Square) -> bool {
    let rows = band.rows().intersect(square.row, square.row + square.size);
    if rows.is_empty() {
        return false;
    }
    // membership is tested against the full grid side, not the square's
    let side = band.side();
    for row in rows {
        for col in square.col..square.col + square.size {
            let state = if is_in_carpet(row, col, side) {
                PRESENT
            } else {
                ABSENT
            };
            band.set(row, col, state);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, GridSpec};
    use ndarray::Array2;

    fn carpet(depth: u32) -> Grid {
        let spec = GridSpec::new(depth).unwrap();
        let mut grid = Grid::new(spec).unwrap();
        fill(&mut grid.band_mut(), Square::whole(spec.side()), depth);
        grid
    }

    #[test]
    fn depth_one_removes_only_the_centre() {
        let grid = carpet(1);
        assert_eq!(grid.to_row_major(), vec![1, 1, 1, 1, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn depth_two_keeps_sixty_four_cells() {
        let grid = carpet(2);
        assert_eq!(grid.side(), 9);
        assert_eq!(grid.count_present(), 64);
        assert_eq!(grid.get(4, 4), ABSENT);
        assert_eq!(grid.get(1, 1), ABSENT);
        assert_eq!(grid.get(7, 4), ABSENT);
        assert_eq!(grid.get(0, 0), PRESENT);
    }

    #[test]
    fn depth_zero_leaves_the_buffer_untouched() {
        let mut cells = Array2::from_elem((3, 3), ABSENT);
        let mut band = Band::new(cells.view_mut(), 0, 0, 3);
        fill(&mut band, Square::whole(3), 0);
        assert!(cells.iter().all(|&state| state == ABSENT));
    }

    #[test]
    fn band_writes_stay_inside_owned_rows() {
        let side = 9;
        // rows 3..5 of a depth-2 grid
        let mut cells = Array2::from_elem((2, side), PRESENT);
        let mut band = Band::new(cells.view_mut(), 3, 0, side);
        fill(&mut band, Square::whole(side), 2);

        let full = carpet(2);
        for (offset, row) in (3..5).enumerate() {
            for col in 0..side {
                assert_eq!(cells[[offset, col]], full.get(row, col));
            }
        }
    }
}
