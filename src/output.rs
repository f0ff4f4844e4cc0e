//! Plain-text artifacts.
//!
//! A grid is written as `side` lines of `side` space-separated `0`/`1`
//! tokens, row-major, each line ending in a newline. A sum is a single
//! integer.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{CarpetError, Result};
use crate::grid::{Grid, ABSENT, PRESENT};

pub fn write_grid_to<W: Write>(writer: W, grid: &Grid) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for row in grid.rows() {
        let mut first = true;
        for &state in row.iter() {
            if !first {
                writer.write_all(b" ")?;
            }
            writer.write_all(if state == PRESENT { b"1" } else { b"0" })?;
            first = false;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_grid(path: &Path, grid: &Grid) -> Result<()> {
    write_grid_to(File::create(path)?, grid)
}

/// Parses a grid artifact. Token separators may be any whitespace and blank
/// lines are skipped, but every row must have the same number of tokens as
/// there are rows.
pub fn read_grid<R: BufRead>(reader: R) -> Result<Grid> {
    let mut states = Vec::new();
    let mut width = None;
    let mut rows = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let before = states.len();
        for token in line.split_whitespace() {
            let state = match token {
                "1" => PRESENT,
                "0" => ABSENT,
                other => {
                    return Err(CarpetError::Parse {
                        line: number,
                        message: format!("unexpected token {other:?}"),
                    })
                }
            };
            states.push(state);
        }
        let count = states.len() - before;
        match width {
            None => width = Some(count),
            Some(expected) if expected != count => {
                return Err(CarpetError::Parse {
                    line: number,
                    message: format!("expected {expected} cells, found {count}"),
                });
            }
            Some(_) => {}
        }
        rows += 1;
    }

    let side = width.ok_or(CarpetError::Parse {
        line: 0,
        message: "empty grid".into(),
    })?;
    if rows != side {
        return Err(CarpetError::Parse {
            line: rows,
            message: format!("grid is {rows}x{side}, expected a square"),
        });
    }
    Grid::from_row_major(side, states)
}

pub fn read_grid_path(path: &Path) -> Result<Grid> {
    read_grid(BufReader::new(File::open(path)?))
}

pub fn write_sum(path: &Path, total: i64) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{total}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;
    use crate::sequential;

    #[test]
    fn depth_one_text_layout() {
        let grid = sequential::run(GridSpec::new(1).unwrap()).unwrap();
        let mut buffer = Vec::new();
        write_grid_to(&mut buffer, &grid).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "1 1 1\n1 0 1\n1 1 1\n");
    }

    #[test]
    fn reader_accepts_trailing_spaces() {
        // the format older writers produced
        let text = "1 1 1 \n1 0 1 \n1 1 1 \n\n";
        let grid = read_grid(text.as_bytes()).unwrap();
        assert_eq!(grid, sequential::run(GridSpec::new(1).unwrap()).unwrap());
    }

    #[test]
    fn reader_rejects_malformed_grids() {
        let ragged = read_grid("1 1\n1\n".as_bytes()).unwrap_err();
        assert!(matches!(ragged, CarpetError::Parse { line: 2, .. }));

        let token = read_grid("1 x\n1 1\n".as_bytes()).unwrap_err();
        assert!(matches!(token, CarpetError::Parse { line: 1, .. }));

        let oblong = read_grid("1 1\n".as_bytes()).unwrap_err();
        assert!(matches!(oblong, CarpetError::Parse { .. }));

        let empty = read_grid("".as_bytes()).unwrap_err();
        assert!(matches!(empty, CarpetError::Parse { line: 0, .. }));
    }
}
