//! Channel wiring for a ring of workers.
//!
//! [`Fabric::ring`] creates every channel a run needs and hands each rank an
//! [`Endpoint`] that owns its ends exclusively:
//!
//! - two halo channels per rank and direction (one per [`Tag`]), linking the
//!   rank to its ring neighbours;
//! - a downlink (coordinator → worker) and an uplink (worker → coordinator)
//!   for every non-root rank.
//!
//! Endpoints are `Send` and are moved into their worker threads.  Dropping an
//! endpoint disconnects all of its channels, which is how an aborting worker
//! wakes up every peer that is waiting on it.

use std::time::{Duration, Instant};

use crossbeam_channel::{
    Receiver, RecvTimeoutError, Select, SendTimeoutError, Sender, TrySendError, bounded, unbounded,
};
use rustc_hash::FxHashMap;
use tracing::trace;

use ca_core::{Cell, CommMode, Rank};
use ca_partition::Topology;

use crate::{CommError, CommResult, Op, Tag, Transport, Uplink};

// ── Configuration ─────────────────────────────────────────────────────────────

/// How halo sends are delivered.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Delivery {
    /// Unbounded queues: a send never waits for its receiver.
    #[default]
    Buffered,
    /// Zero-capacity channels: a send waits until the receiver takes it.
    Rendezvous,
}

/// Fabric settings shared by every endpoint of a run.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct CommConfig {
    pub delivery: Delivery,
    /// Upper bound on any single blocking operation.  `None` waits forever.
    pub timeout:  Option<Duration>,
}

impl CommConfig {
    /// The delivery each communication mode is designed around.
    pub fn for_mode(mode: CommMode) -> Self {
        let delivery = match mode {
            CommMode::Async => Delivery::Buffered,
            CommMode::Sync  => Delivery::Rendezvous,
        };
        Self { delivery, timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// Coordinator-side ends of the per-worker links.  Index `r - 1` is rank `r`.
pub(crate) struct RootLinks {
    pub(crate) downlinks: Vec<Sender<Vec<Cell>>>,
    pub(crate) uplinks:   Vec<Receiver<Uplink>>,
}

/// Worker-side ends of the coordinator links.
pub(crate) struct WorkerLinks {
    pub(crate) downlink: Receiver<Vec<Cell>>,
    pub(crate) uplink:   Sender<Uplink>,
}

pub(crate) enum CoordinatorLink {
    Root(RootLinks),
    Worker(WorkerLinks),
}

/// One rank's exclusive view of the fabric.
pub struct Endpoint {
    rank:     Rank,
    topology: Topology,
    config:   CommConfig,
    outbound: FxHashMap<(Rank, Tag), Sender<Cell>>,
    inbound:  FxHashMap<(Rank, Tag), Receiver<Cell>>,
    pub(crate) coordinator: CoordinatorLink,
}

impl Endpoint {
    #[inline]
    pub fn is_root(&self) -> bool {
        self.rank.is_root()
    }

    fn sender(&self, to: Rank, tag: Tag) -> CommResult<&Sender<Cell>> {
        self.outbound.get(&(to, tag)).ok_or(CommError::NotNeighbour {
            rank: self.rank,
            peer: to,
            tag,
        })
    }

    fn receiver(&self, from: Rank, tag: Tag) -> CommResult<&Receiver<Cell>> {
        self.inbound.get(&(from, tag)).ok_or(CommError::NotNeighbour {
            rank: self.rank,
            peer: from,
            tag,
        })
    }

    /// Receive from `rx` honouring the configured timeout.
    pub(crate) fn recv_from<T>(&self, rx: &Receiver<T>, peer: Rank, op: Op) -> CommResult<T> {
        match self.config.timeout {
            None => rx.recv().map_err(|_| CommError::PeerDisconnected { peer, op }),
            Some(after) => rx.recv_timeout(after).map_err(|e| match e {
                RecvTimeoutError::Timeout      => CommError::Timeout { peer, op, after },
                RecvTimeoutError::Disconnected => CommError::PeerDisconnected { peer, op },
            }),
        }
    }

    /// Send on `tx` honouring the configured timeout.
    pub(crate) fn send_to<T>(&self, tx: &Sender<T>, value: T, peer: Rank, op: Op) -> CommResult<()> {
        match self.config.timeout {
            None => tx.send(value).map_err(|_| CommError::PeerDisconnected { peer, op }),
            Some(after) => tx.send_timeout(value, after).map_err(|e| match e {
                SendTimeoutError::Timeout(_)      => CommError::Timeout { peer, op, after },
                SendTimeoutError::Disconnected(_) => CommError::PeerDisconnected { peer, op },
            }),
        }
    }
}

impl Transport for Endpoint {
    #[inline]
    fn rank(&self) -> Rank {
        self.rank
    }

    #[inline]
    fn topology(&self) -> Topology {
        self.topology
    }

    fn send(&self, to: Rank, tag: Tag, value: Cell) -> CommResult<()> {
        let tx = self.sender(to, tag)?;
        trace!(rank = self.rank.0, to = to.0, %tag, "send");
        self.send_to(tx, value, to, Op::Send)
    }

    fn post(&self, to: Rank, tag: Tag, value: Cell) -> CommResult<()> {
        let tx = self.sender(to, tag)?;
        trace!(rank = self.rank.0, to = to.0, %tag, "post");
        tx.try_send(value).map_err(|e| match e {
            TrySendError::Full(_)         => CommError::WouldBlock { peer: to, op: Op::Post },
            TrySendError::Disconnected(_) => CommError::PeerDisconnected { peer: to, op: Op::Post },
        })
    }

    fn recv(&self, from: Rank, tag: Tag) -> CommResult<Cell> {
        let rx = self.receiver(from, tag)?;
        trace!(rank = self.rank.0, from = from.0, %tag, "recv");
        self.recv_from(rx, from, Op::Recv)
    }

    fn wait_all(&self, pending: &[(Rank, Tag)]) -> CommResult<Vec<Cell>> {
        let receivers = pending
            .iter()
            .map(|&(from, tag)| self.receiver(from, tag))
            .collect::<CommResult<Vec<_>>>()?;

        let deadline = self.config.timeout.map(|after| (Instant::now() + after, after));
        let mut results: Vec<Option<Cell>> = vec![None; pending.len()];
        let mut remaining = pending.len();

        while remaining > 0 {
            // Rebuild the selection over whatever is still outstanding.
            let mut select = Select::new();
            let mut slots = Vec::with_capacity(remaining);
            for (slot, rx) in receivers.iter().enumerate() {
                if results[slot].is_none() {
                    select.recv(rx);
                    slots.push(slot);
                }
            }

            let oper = match deadline {
                None => select.select(),
                Some((at, after)) => select.select_deadline(at).map_err(|_| {
                    // Report the first receive still outstanding.
                    let peer = pending[slots[0]].0;
                    CommError::Timeout { peer, op: Op::WaitAll, after }
                })?,
            };

            let slot = slots[oper.index()];
            let peer = pending[slot].0;
            let value = oper
                .recv(receivers[slot])
                .map_err(|_| CommError::PeerDisconnected { peer, op: Op::WaitAll })?;
            trace!(rank = self.rank.0, from = peer.0, tag = %pending[slot].1, "wait_all completed one");
            results[slot] = Some(value);
            remaining -= 1;
        }

        Ok(results.into_iter().flatten().collect())
    }
}

// ── Fabric ────────────────────────────────────────────────────────────────────

/// Builds the channel mesh for a ring.
pub struct Fabric;

impl Fabric {
    /// Create one [`Endpoint`] per rank of a `size`-worker ring.  The vector
    /// is indexed by rank; entry 0 is the coordinator.
    pub fn ring(size: usize, config: CommConfig) -> CommResult<Vec<Endpoint>> {
        let topology = Topology::ring(size)?;

        let mut outbound: Vec<FxHashMap<(Rank, Tag), Sender<Cell>>> =
            (0..size).map(|_| FxHashMap::default()).collect();
        let mut inbound: Vec<FxHashMap<(Rank, Tag), Receiver<Cell>>> =
            (0..size).map(|_| FxHashMap::default()).collect();

        for from in topology.ranks() {
            for tag in Tag::ALL {
                let to = match tag {
                    Tag::Rightward => topology.right(from),
                    Tag::Leftward  => topology.left(from),
                };
                let (tx, rx) = halo_channel(config.delivery, from == to);
                outbound[from.index()].insert((to, tag), tx);
                inbound[to.index()].insert((from, tag), rx);
            }
        }

        // Coordinator links: scatter and gather traffic is never on the
        // halo critical path, so it is always buffered.
        let mut downlinks = Vec::with_capacity(size.saturating_sub(1));
        let mut uplinks   = Vec::with_capacity(size.saturating_sub(1));
        let mut worker_links = Vec::with_capacity(size.saturating_sub(1));
        for _ in 1..size {
            let (down_tx, down_rx) = unbounded();
            let (up_tx, up_rx)     = unbounded();
            downlinks.push(down_tx);
            uplinks.push(up_rx);
            worker_links.push(WorkerLinks { downlink: down_rx, uplink: up_tx });
        }

        let mut coordinator_links = Vec::with_capacity(size);
        coordinator_links.push(CoordinatorLink::Root(RootLinks { downlinks, uplinks }));
        coordinator_links.extend(worker_links.into_iter().map(CoordinatorLink::Worker));

        let endpoints = outbound
            .into_iter()
            .zip(inbound)
            .zip(coordinator_links)
            .enumerate()
            .map(|(r, ((outbound, inbound), coordinator))| Endpoint {
                rank: Rank(r as u32),
                topology,
                config,
                outbound,
                inbound,
                coordinator,
            })
            .collect();

        Ok(endpoints)
    }
}

/// A halo channel with the capacity `delivery` calls for.
///
/// A rendezvous self-loop gets one slot: with a single worker the rank is
/// both sender and receiver, and a zero-capacity channel could never match.
fn halo_channel(delivery: Delivery, self_loop: bool) -> (Sender<Cell>, Receiver<Cell>) {
    match delivery {
        Delivery::Buffered               => unbounded(),
        Delivery::Rendezvous if self_loop => bounded(1),
        Delivery::Rendezvous             => bounded(0),
    }
}
