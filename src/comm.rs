//! In-process collective operations over a fixed set of ranks.
//!
//! A world of `size` ranks is wired once with `std::sync::mpsc` channels:
//! the coordinator (rank 0) holds one sender per worker for broadcasts and
//! the single receiver every worker sends its gather contribution to.
//! Ranks share nothing else. All ranks must call the collectives in the same
//! order, and each rank contributes once per gather.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::error::{CarpetError, Result};

pub const COORDINATOR: usize = 0;

enum Link<B, G> {
    Coordinator {
        peers: Vec<Sender<B>>,
        inbox: Receiver<(usize, G)>,
    },
    Worker {
        config: Receiver<B>,
        outbox: Sender<(usize, G)>,
    },
}

/// One rank's handle onto the world. `B` is the broadcast payload and `G`
/// the gather payload.
pub struct Endpoint<B, G> {
    rank: usize,
    size: usize,
    link: Link<B, G>,
}

/// Wires a world of `size` ranks and returns the coordinator endpoint plus
/// the worker endpoints in rank order.
///
/// # Panics
///
/// Panics if `size == 0`.
pub fn world<B, G>(size: usize) -> (Endpoint<B, G>, Vec<Endpoint<B, G>>) {
    assert!(size > 0, "a world needs at least one rank");
    let (outbox, inbox) = mpsc::channel();
    let mut peers = Vec::with_capacity(size - 1);
    let mut workers = Vec::with_capacity(size - 1);
    for rank in 1..size {
        let (tx, rx) = mpsc::channel();
        peers.push(tx);
        workers.push(Endpoint {
            rank,
            size,
            link: Link::Worker {
                config: rx,
                outbox: outbox.clone(),
            },
        });
    }
    // only workers keep a sender, so a gather notices when they are all gone
    drop(outbox);
    let coordinator = Endpoint {
        rank: COORDINATOR,
        size,
        link: Link::Coordinator { peers, inbox },
    };
    (coordinator, workers)
}

impl<B: Clone, G> Endpoint<B, G> {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == COORDINATOR
    }

    /// One-to-all: the coordinator supplies `value`, every rank returns it.
    /// Workers ignore their argument and block until the value arrives.
    pub fn broadcast(&self, value: Option<B>) -> Result<B> {
        match &self.link {
            Link::Coordinator { peers, .. } => {
                let value = value.ok_or_else(|| {
                    CarpetError::Config("coordinator has no value to broadcast".into())
                })?;
                for (index, peer) in peers.iter().enumerate() {
                    peer.send(value.clone()).map_err(|_| CarpetError::Comm {
                        rank: index + 1,
                        op: "broadcast",
                    })?;
                }
                Ok(value)
            }
            Link::Worker { config, .. } => config.recv().map_err(|_| CarpetError::Comm {
                rank: self.rank,
                op: "broadcast",
            }),
        }
    }

    /// All-to-one: returns every rank's contribution in rank order at the
    /// coordinator and `None` elsewhere. Blocks the coordinator until all
    /// contributions have arrived.
    pub fn gather(&self, item: G) -> Result<Option<Vec<G>>> {
        match &self.link {
            Link::Worker { outbox, .. } => {
                outbox
                    .send((self.rank, item))
                    .map_err(|_| CarpetError::Comm {
                        rank: COORDINATOR,
                        op: "gather",
                    })?;
                Ok(None)
            }
            Link::Coordinator { inbox, .. } => {
                let mut slots: Vec<Option<G>> = (0..self.size).map(|_| None).collect();
                slots[COORDINATOR] = Some(item);
                for _ in 1..self.size {
                    let (rank, item) = inbox.recv().map_err(|_| CarpetError::Comm {
                        rank: first_missing(&slots),
                        op: "gather",
                    })?;
                    if slots[rank].replace(item).is_some() {
                        return Err(CarpetError::Comm {
                            rank,
                            op: "gather (duplicate contribution)",
                        });
                    }
                }
                let items = slots.into_iter().flatten().collect();
                Ok(Some(items))
            }
        }
    }

    /// Gathers one integer per rank and sums them at the coordinator.
    pub fn reduce_sum(&self, value: i64) -> Result<Option<i64>>
    where
        G: From<i64> + Into<i64>,
    {
        let Some(values) = self.gather(G::from(value))? else {
            return Ok(None);
        };
        checked_total(values.into_iter().map(Into::into)).map(Some)
    }
}

pub(crate) fn checked_total(values: impl IntoIterator<Item = i64>) -> Result<i64> {
    values
        .into_iter()
        .try_fold(0i64, |total, value| total.checked_add(value))
        .ok_or(CarpetError::SumOverflow)
}

fn first_missing<G>(slots: &[Option<G>]) -> usize {
    slots.iter().position(Option::is_none).unwrap_or(COORDINATOR)
}

/// Runs `rank_main` once per rank: workers on their own threads, the
/// coordinator on the calling thread with `root_input`. Joins every worker
/// and returns what the coordinator produced.
///
/// A panicked worker takes precedence over any other failure, then the
/// coordinator's own error, then the first worker error. A coordinator
/// disconnect caused by a failed worker reports the worker's error.
pub fn launch<B, G, T, F>(size: usize, root_input: B, rank_main: F) -> Result<T>
where
    B: Clone + Send + 'static,
    G: Send + 'static,
    T: Send + 'static,
    F: Fn(Endpoint<B, G>, Option<B>) -> Result<Option<T>> + Send + Sync + 'static,
{
    if size == 0 {
        return Err(CarpetError::Config("at least one worker is required".into()));
    }
    let (coordinator, workers) = world::<B, G>(size);
    let rank_main = Arc::new(rank_main);

    let mut handles = Vec::with_capacity(workers.len());
    for endpoint in workers {
        let rank = endpoint.rank();
        let rank_main = Arc::clone(&rank_main);
        let handle = thread::Builder::new()
            .name(format!("carpet-rank-{rank}"))
            .spawn(move || rank_main(endpoint, None))?;
        handles.push((rank, handle));
    }
    debug!(ranks = size, "world launched");

    let outcome = rank_main(coordinator, Some(root_input));

    let mut panicked = None;
    let mut failure = None;
    for (rank, handle) in handles {
        match handle.join() {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                warn!(rank, error = %err, "worker failed");
                failure.get_or_insert(err);
            }
            Err(_) => {
                warn!(rank, "worker panicked");
                panicked.get_or_insert(rank);
            }
        }
    }
    if let Some(rank) = panicked {
        return Err(CarpetError::WorkerPanicked { rank });
    }
    // a disconnect seen by the coordinator is only the echo of a worker's
    // own failure, so the worker's error is the one worth reporting
    let produced = match outcome {
        Err(CarpetError::Comm { .. }) if failure.is_some() => None,
        outcome => outcome?,
    };
    if let Some(err) = failure {
        return Err(err);
    }
    produced.ok_or(CarpetError::Comm {
        rank: COORDINATOR,
        op: "finalize",
    })
}
