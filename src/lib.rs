//! Partitioned recursive tiling of a ternary carpet.
//!
//! A square of side `3^depth` is cut into a 3x3 grid, the centre block is
//! removed, and the rule repeats inside the eight remaining blocks. The same
//! grid can be produced three ways, and all of them must yield identical
//! bytes:
//!
//! - [`sequential`]: one thread, direct recursion (the baseline).
//! - [`parallel`]: fork-join tasks on a rayon pool, one task per surviving
//!   block, each owning a disjoint `ndarray` view.
//! - [`distributed`]: isolated ranks that receive the configuration by
//!   broadcast, fill their own row range and send it to the coordinator.
//!
//! [`reduction`] applies the same row-block partitioning to a 1-D array sum.
//!
//! # Example
//!
//! ```
//! use ternary_carpet::{GridSpec, Strategy};
//!
//! let spec = GridSpec::new(2)?;
//! let grid = Strategy::Distributed.run(spec, 4)?;
//! assert_eq!(grid.count_present(), 64);
//! # Ok::<(), ternary_carpet::CarpetError>(())
//! ```

pub mod comm;
pub mod config;
pub mod distributed;
mod error;
pub mod grid;
pub mod membership;
pub mod output;
pub mod parallel;
pub mod partition;
pub mod reduction;
pub mod sequential;
pub mod strategy;
pub mod tiler;
pub mod visualizer;

pub use config::RunConfig;
pub use error::{CarpetError, Result};
pub use grid::{Grid, GridSpec, Square};
pub use membership::is_in_carpet;
pub use partition::{partition, partitions, RowRange};
pub use reduction::SumReport;
pub use strategy::{compare, Comparison, Strategy};
