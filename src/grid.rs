//! Grid storage: the validated run shape, the row-major cell arena and
//! mutable bands over it.
//!
//! Cells are `u8` states, [`PRESENT`] or [`ABSENT`]. Buffers are allocated
//! present, so a cell only becomes absent when a centre-block test excludes
//! it; a depth-0 grid is therefore one present cell.

use ndarray::{s, Array2, ArrayView1, ArrayViewMut2, Axis};

use crate::error::{CarpetError, Result};
use crate::partition::RowRange;

pub const PRESENT: u8 = 1;
pub const ABSENT: u8 = 0;

/// Validated recursion depth together with its side length `3^depth`.
///
/// Construction fails before anything is allocated if `side * side` cells
/// would not fit in the largest allocation the platform allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    depth: u32,
    side: usize,
}

impl GridSpec {
    pub fn new(depth: u32) -> Result<Self> {
        let side = 3usize
            .checked_pow(depth)
            .ok_or(CarpetError::Capacity { depth })?;
        let cells = side
            .checked_mul(side)
            .ok_or(CarpetError::Capacity { depth })?;
        // one byte per cell
        if cells > isize::MAX as usize {
            return Err(CarpetError::Capacity { depth });
        }
        Ok(Self { depth, side })
    }

    /// Derives the depth from an explicit side length, which must be a
    /// power of three.
    pub fn from_side(side: usize) -> Result<Self> {
        if side == 0 {
            return Err(CarpetError::Config("grid side must be at least 1".into()));
        }
        let mut depth = 0u32;
        let mut rest = side;
        while rest % 3 == 0 {
            rest /= 3;
            depth += 1;
        }
        if rest != 1 {
            return Err(CarpetError::Config(format!(
                "grid side {side} is not a power of three"
            )));
        }
        Self::new(depth)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn cells(&self) -> usize {
        self.side * self.side
    }
}

/// Axis-aligned square region in global grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Square {
    pub row: usize,
    pub col: usize,
    pub size: usize,
}

impl Square {
    pub fn whole(side: usize) -> Self {
        Self { row: 0, col: 0, size: side }
    }

    /// Sub-square at block `(block_row, block_col)` of the 3x3 subdivision.
    pub fn child(&self, block_row: usize, block_col: usize) -> Self {
        let size = self.size / 3;
        Self {
            row: self.row + block_row * size,
            col: self.col + block_col * size,
            size,
        }
    }

    /// The eight sub-squares of the 3x3 subdivision, centre skipped.
    pub fn children(self) -> impl Iterator<Item = Square> {
        (0..3)
            .flat_map(|block_row| (0..3).map(move |block_col| (block_row, block_col)))
            .filter(|&blocks| blocks != (1, 1))
            .map(move |(block_row, block_col)| self.child(block_row, block_col))
    }
}

/// Square cell arena, row-major: cell `(row, col)` sits at `row * side + col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Array2<u8>,
}

impl Grid {
    /// Allocates a present-by-default grid, or reports `Capacity` when the
    /// allocator refuses the arena.
    pub fn new(spec: GridSpec) -> Result<Self> {
        let cells = allocate_cells(spec.depth(), spec.side(), spec.side())?;
        Ok(Self { cells })
    }

    /// Builds a grid of arbitrary side from row-major states.
    pub fn from_row_major(side: usize, states: Vec<u8>) -> Result<Self> {
        let cells = Array2::from_shape_vec((side, side), states).map_err(|err| {
            CarpetError::Config(format!("cannot shape {side}x{side} grid: {err}"))
        })?;
        if let Some(bad) = cells.iter().find(|&&state| state > PRESENT) {
            return Err(CarpetError::Config(format!("invalid cell state {bad}")));
        }
        Ok(Self { cells })
    }

    pub fn side(&self) -> usize {
        self.cells.nrows()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[[row, col]]
    }

    /// State at linear index `row * side + col`.
    pub fn get_linear(&self, index: usize) -> u8 {
        let side = self.side();
        self.cells[[index / side, index % side]]
    }

    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, u8>> {
        self.cells.axis_iter(Axis(0))
    }

    /// States in linear index order.
    pub fn to_row_major(&self) -> Vec<u8> {
        self.cells.iter().copied().collect()
    }

    pub fn count_present(&self) -> usize {
        self.cells.iter().filter(|&&state| state == PRESENT).count()
    }

    /// Mutable band covering the whole grid.
    pub fn band_mut(&mut self) -> Band<'_> {
        let side = self.side();
        Band::new(self.cells.view_mut(), 0, 0, side)
    }

    /// Copies a worker's slice into the rows it owns.
    ///
    /// # Panics
    ///
    /// Panics if `slice` is not `range.len() x side`.
    pub fn write_rows(&mut self, range: RowRange, slice: &Array2<u8>) {
        self.cells
            .slice_mut(s![range.start..range.end, ..])
            .assign(slice);
    }
}

/// Fallible `rows x cols` buffer of present cells.
///
/// The reservation happens before any cell is written, so a grid the
/// machine cannot hold surfaces as an error instead of an allocation abort.
pub fn allocate_cells(depth: u32, rows: usize, cols: usize) -> Result<Array2<u8>> {
    let len = rows
        .checked_mul(cols)
        .ok_or(CarpetError::Capacity { depth })?;
    let mut states = Vec::new();
    states
        .try_reserve_exact(len)
        .map_err(|_| CarpetError::Capacity { depth })?;
    states.resize(len, PRESENT);
    Array2::from_shape_vec((rows, cols), states).map_err(|_| CarpetError::Capacity { depth })
}

/// Mutable window onto cell storage, addressed in global coordinates.
///
/// `row0`/`col0` locate the window's top-left cell in the full grid and
/// `side` is the full grid side used for membership tests. Bands produced by
/// [`Band::split3`] never alias.
#[derive(Debug)]
pub struct Band<'a> {
    cells: ArrayViewMut2<'a, u8>,
    row0: usize,
    col0: usize,
    side: usize,
}

impl<'a> Band<'a> {
    pub fn new(cells: ArrayViewMut2<'a, u8>, row0: usize, col0: usize, side: usize) -> Self {
        Self {
            cells,
            row0,
            col0,
            side,
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Global rows covered by this band.
    pub fn rows(&self) -> RowRange {
        RowRange::new(self.row0, self.row0 + self.cells.nrows())
    }

    pub fn set(&mut self, row: usize, col: usize, state: u8) {
        self.cells[[row - self.row0, col - self.col0]] = state;
    }

    /// Splits a band of `3 * block` by `3 * block` cells into its nine
    /// blocks, indexed `[block_row][block_col]`.
    pub fn split3(self, block: usize) -> [[Band<'a>; 3]; 3] {
        let Band {
            cells,
            row0,
            col0,
            side,
        } = self;
        debug_assert_eq!(cells.dim(), (3 * block, 3 * block));
        let (top, rest) = cells.split_at(Axis(0), block);
        let (middle, bottom) = rest.split_at(Axis(0), block);
        let strip = |cells: ArrayViewMut2<'a, u8>, strip_row0: usize| -> [Band<'a>; 3] {
            let (left, rest) = cells.split_at(Axis(1), block);
            let (centre, right) = rest.split_at(Axis(1), block);
            [
                Band::new(left, strip_row0, col0, side),
                Band::new(centre, strip_row0, col0 + block, side),
                Band::new(right, strip_row0, col0 + 2 * block, side),
            ]
        };
        [
            strip(top, row0),
            strip(middle, row0 + block),
            strip(bottom, row0 + 2 * block),
        ]
    }
}
