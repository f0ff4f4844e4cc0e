use std::path::Path;

use plotters::prelude::*;

use crate::error::{CarpetError, Result};
use crate::grid::{Grid, PRESENT};

/// Draws the grid as a PNG, one `cell_px` square per cell: present cells
/// black on a white background.
pub fn render_png(grid: &Grid, output_path: &Path, cell_px: u32) -> Result<()> {
    let cell_px = cell_px.max(1);
    let extent = u32::try_from(grid.side())
        .ok()
        .and_then(|side| side.checked_mul(cell_px))
        .filter(|&extent| extent <= i32::MAX as u32)
        .ok_or_else(|| {
            CarpetError::Render(format!(
                "{} cells at {cell_px}px do not fit in a bitmap",
                grid.side()
            ))
        })?;

    let root = BitMapBackend::new(output_path, (extent, extent)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let step = cell_px as i32;
    for (row, cells) in grid.rows().enumerate() {
        let y = row as i32 * step;
        for (col, &state) in cells.iter().enumerate() {
            if state != PRESENT {
                continue;
            }
            let x = col as i32 * step;
            root.draw(&Rectangle::new(
                [(x, y), (x + step, y + step)],
                BLACK.filled(),
            ))
            .map_err(render_error)?;
        }
    }

    root.present().map_err(render_error)?;
    Ok(())
}

fn render_error(err: impl std::fmt::Display) -> CarpetError {
    CarpetError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;
    use crate::sequential;

    #[test]
    fn writes_scaled_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carpet.png");
        let grid = sequential::run(GridSpec::new(2).unwrap()).unwrap();
        render_png(&grid, &path, 4).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
