use crate::error::{CarpetError, Result};
use crate::grid::GridSpec;
use crate::strategy::Strategy;

/// Recursion depth used when none is configured.
pub const DEFAULT_DEPTH: u32 = 2;

/// Deepest carpet accepted as input. Deeper requests are configuration
/// errors; shallower ones may still fail the capacity check.
pub const MAX_DEPTH: u32 = 40;

/// Fallback worker count: one per thread rayon would use.
pub fn default_workers() -> usize {
    rayon::current_num_threads()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub depth: u32,
    /// Explicit side length; when set it determines the depth.
    pub side: Option<usize>,
    pub workers: usize,
    pub strategy: Strategy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            side: None,
            workers: default_workers(),
            strategy: Strategy::Sequential,
        }
    }
}

impl RunConfig {
    /// Validates the whole configuration and returns the grid shape to
    /// allocate. Nothing is allocated or computed here.
    pub fn grid_spec(&self) -> Result<GridSpec> {
        if self.workers == 0 {
            return Err(CarpetError::Config("worker count must be at least 1".into()));
        }
        match self.side {
            Some(side) => GridSpec::from_side(side),
            None if self.depth > MAX_DEPTH => Err(CarpetError::Config(format!(
                "depth {} is out of range (maximum {MAX_DEPTH})",
                self.depth
            ))),
            None => GridSpec::new(self.depth),
        }
    }
}
