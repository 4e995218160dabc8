//! Point-to-point message operations between ring neighbours.

use ca_core::{Cell, Rank};
use ca_partition::Topology;

use crate::{CommResult, Tag};

/// Scalar halo messaging as seen by one worker.
///
/// [`Endpoint`][crate::Endpoint] is the production implementation; tests
/// substitute recording transports to check operation order without running a
/// ring of threads.
pub trait Transport {
    /// This worker's rank.
    fn rank(&self) -> Rank;

    /// The ring this worker belongs to.
    fn topology(&self) -> Topology;

    /// Blocking send.  On a rendezvous fabric this returns only once `to`
    /// has received the value; on a buffered fabric it returns immediately.
    fn send(&self, to: Rank, tag: Tag, value: Cell) -> CommResult<()>;

    /// Non-blocking send.  Never suspends; fails with
    /// [`CommError::WouldBlock`][crate::CommError::WouldBlock] if the value
    /// cannot be handed over without waiting for the receiver.
    fn post(&self, to: Rank, tag: Tag, value: Cell) -> CommResult<()>;

    /// Blocking receive of the next value `from` sent with `tag`.
    fn recv(&self, from: Rank, tag: Tag) -> CommResult<Cell>;

    /// Join point: complete every pending receive, in whatever order the
    /// values arrive.  Results are returned in the order of `pending`.
    fn wait_all(&self, pending: &[(Rank, Tag)]) -> CommResult<Vec<Cell>>;

    #[inline]
    fn left(&self) -> Rank {
        self.topology().left(self.rank())
    }

    #[inline]
    fn right(&self) -> Rank {
        self.topology().right(self.rank())
    }
}
