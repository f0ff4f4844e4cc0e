use std::fmt;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use tracing::info;

use crate::error::{CarpetError, Result};
use crate::grid::{Grid, GridSpec};
use crate::{distributed, parallel, sequential};

/// Interchangeable ways of producing the same grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// One thread, direct recursion.
    Sequential,
    /// Fork-join tasks on a work-stealing pool.
    Parallel,
    /// Isolated ranks exchanging messages.
    Distributed,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::Sequential,
        Strategy::Parallel,
        Strategy::Distributed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Parallel => "parallel",
            Strategy::Distributed => "distributed",
        }
    }

    /// `workers` is the thread count for `Parallel`, the rank count for
    /// `Distributed`, and ignored by `Sequential`.
    pub fn run(self, spec: GridSpec, workers: usize) -> Result<Grid> {
        match self {
            Strategy::Sequential => sequential::run(spec),
            Strategy::Parallel => parallel::run(spec, workers),
            Strategy::Distributed => distributed::run(spec, workers),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub strategy: Strategy,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct Comparison {
    pub grid: Grid,
    pub timings: Vec<Timing>,
}

/// Runs every strategy on `spec` and fails on the first grid that differs
/// from the sequential one.
pub fn compare(spec: GridSpec, workers: usize) -> Result<Comparison> {
    let mut baseline: Option<Grid> = None;
    let mut timings = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let start_time = Instant::now();
        let grid = strategy.run(spec, workers)?;
        let elapsed = start_time.elapsed();
        info!(%strategy, ?elapsed, "strategy finished");
        timings.push(Timing { strategy, elapsed });

        match &baseline {
            Some(expected) if *expected != grid => {
                return Err(CarpetError::Divergence {
                    strategy: strategy.name(),
                });
            }
            Some(_) => {}
            None => baseline = Some(grid),
        }
    }
    let grid = baseline.ok_or(CarpetError::Divergence {
        strategy: Strategy::Sequential.name(),
    })?;
    Ok(Comparison { grid, timings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_agrees_and_times_everything() {
        let comparison = compare(GridSpec::new(3).unwrap(), 4).unwrap();
        assert_eq!(comparison.grid.count_present(), 512);
        let order: Vec<_> = comparison.timings.iter().map(|t| t.strategy).collect();
        assert_eq!(order, Strategy::ALL.to_vec());
    }

    #[test]
    fn names_match_cli_values() {
        for strategy in Strategy::ALL {
            let parsed = Strategy::from_str(strategy.name(), false).unwrap();
            assert_eq!(parsed, strategy);
        }
    }
}
