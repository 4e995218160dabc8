//! Per-timestep halo exchange.
//!
//! Each step a worker sends its first cell to its left neighbour and its last
//! cell to its right neighbour, and receives the matching values back as its
//! two ghost cells.  That is exactly two sends and two receives per worker per
//! step, whichever strategy runs them.
//!
//! Both strategies deliver the same ghost values for the same boundary cells;
//! they differ only in where a worker can be suspended:
//!
//! | Strategy          | Suspends at                    | Needs                 |
//! |-------------------|--------------------------------|-----------------------|
//! | [`AsyncExchange`] | one `wait_all` join            | buffered delivery     |
//! | [`ParityExchange`]| every blocking `send` / `recv` | any delivery          |

use ca_core::Cell;

use crate::{CommResult, Tag, Transport};

/// A segment's outward-facing cells.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Boundary {
    pub first: Cell,
    pub last:  Cell,
}

impl Boundary {
    /// Boundary of a non-empty segment.
    ///
    /// # Panics
    /// Panics if `cells` is empty; the partition layout never produces an
    /// empty segment.
    pub fn of(cells: &[Cell]) -> Self {
        Self { first: cells[0], last: cells[cells.len() - 1] }
    }
}

/// Neighbour values copied in for one step.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Ghosts {
    /// Last cell of the left neighbour's segment.
    pub left:  Cell,
    /// First cell of the right neighbour's segment.
    pub right: Cell,
}

/// Message operations performed by a strategy, cumulative.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ExchangeStats {
    pub exchanges: u64,
    pub sends:     u64,
    pub recvs:     u64,
}

impl ExchangeStats {
    #[inline]
    pub fn operations(&self) -> u64 {
        self.sends + self.recvs
    }
}

/// A halo-exchange strategy.
///
/// Each worker owns its own strategy value, so implementations may keep
/// per-worker counters without synchronisation.
pub trait HaloExchange: Clone + Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Swap boundary values with both ring neighbours.
    fn exchange<T: Transport + ?Sized>(&mut self, transport: &T, boundary: Boundary) -> CommResult<Ghosts>;

    fn stats(&self) -> ExchangeStats;
}

// ── AsyncExchange ─────────────────────────────────────────────────────────────

/// Post both sends, then wait once for both receives.
///
/// No ordering among the four operations is assumed: the sends never block,
/// so no worker can wait on a peer that is itself waiting to send.
#[derive(Clone, Debug, Default)]
pub struct AsyncExchange {
    stats: ExchangeStats,
}

impl HaloExchange for AsyncExchange {
    fn name(&self) -> &'static str {
        "async"
    }

    fn exchange<T: Transport + ?Sized>(&mut self, transport: &T, boundary: Boundary) -> CommResult<Ghosts> {
        let left  = transport.left();
        let right = transport.right();

        transport.post(right, Tag::Rightward, boundary.last)?;
        transport.post(left, Tag::Leftward, boundary.first)?;
        self.stats.sends += 2;

        let got = transport.wait_all(&[(left, Tag::Rightward), (right, Tag::Leftward)])?;
        self.stats.recvs += 2;
        self.stats.exchanges += 1;

        Ok(Ghosts { left: got[0], right: got[1] })
    }

    fn stats(&self) -> ExchangeStats {
        self.stats
    }
}

// ── ParityExchange ────────────────────────────────────────────────────────────

/// Blocking sends and receives ordered by rank parity.
///
/// ```text
///   even rank: send→right, recv←left, send→left,  recv←right
///   odd rank:  recv←left,  send→right, recv←right, send→left
/// ```
///
/// Every blocking send is paired with a neighbour that reaches the matching
/// receive without first needing anything from the sender.  When `P` is odd
/// the two even ranks `P - 1` and `0` are adjacent; rank 0's first send goes
/// to odd rank 1, so it completes and rank 0 reaches its receive from `P - 1`.
#[derive(Clone, Debug, Default)]
pub struct ParityExchange {
    stats: ExchangeStats,
}

impl HaloExchange for ParityExchange {
    fn name(&self) -> &'static str {
        "sync"
    }

    fn exchange<T: Transport + ?Sized>(&mut self, transport: &T, boundary: Boundary) -> CommResult<Ghosts> {
        let left  = transport.left();
        let right = transport.right();

        let ghosts = if transport.rank().is_even() {
            transport.send(right, Tag::Rightward, boundary.last)?;
            let left_ghost = transport.recv(left, Tag::Rightward)?;
            transport.send(left, Tag::Leftward, boundary.first)?;
            let right_ghost = transport.recv(right, Tag::Leftward)?;
            Ghosts { left: left_ghost, right: right_ghost }
        } else {
            let left_ghost = transport.recv(left, Tag::Rightward)?;
            transport.send(right, Tag::Rightward, boundary.last)?;
            let right_ghost = transport.recv(right, Tag::Leftward)?;
            transport.send(left, Tag::Leftward, boundary.first)?;
            Ghosts { left: left_ghost, right: right_ghost }
        };

        self.stats.sends += 2;
        self.stats.recvs += 2;
        self.stats.exchanges += 1;
        Ok(ghosts)
    }

    fn stats(&self) -> ExchangeStats {
        self.stats
    }
}
