use thiserror::Error;

/// Errors produced while configuring, computing or exporting a carpet.
///
/// Every variant is fatal to the run: the computation is a one-shot batch
/// job, so nothing is retried and no partial grid is ever emitted.
#[derive(Debug, Error)]
pub enum CarpetError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("a depth-{depth} grid exceeds addressable storage")]
    Capacity { depth: u32 },

    #[error("worker {rank} disconnected during {op}")]
    Comm { rank: usize, op: &'static str },

    #[error("worker {rank} panicked")]
    WorkerPanicked { rank: usize },

    #[error("partial sums overflow a 64-bit integer")]
    SumOverflow,

    #[error("{strategy} strategy diverged from the sequential baseline")]
    Divergence { strategy: &'static str },

    #[error("malformed grid at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CarpetError>;
