//! Ring neighbourhood of workers.

use ca_core::Rank;

use crate::{PartitionError, PartitionResult};

/// Ring of `P` workers: rank `r` has `left = (r - 1 + P) mod P` and
/// `right = (r + 1) mod P`.  With `P = 1` a rank is its own neighbour on both
/// sides; with `P = 2` both neighbours are the same peer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Topology {
    size: u32,
}

impl Topology {
    pub fn ring(size: usize) -> PartitionResult<Self> {
        if size == 0 {
            return Err(PartitionError::NoWorkers);
        }
        let size = u32::try_from(size).map_err(|_| PartitionError::TooManyWorkers {
            workers: size,
            cells:   u32::MAX as usize,
        })?;
        Ok(Self { size })
    }

    #[inline]
    pub fn left(self, rank: Rank) -> Rank {
        Rank((rank.0 + self.size - 1) % self.size)
    }

    #[inline]
    pub fn right(self, rank: Rank) -> Rank {
        Rank((rank.0 + 1) % self.size)
    }

    /// Ranks in ring order, starting from the coordinator.
    pub fn ranks(self) -> impl Iterator<Item = Rank> {
        (0..self.size).map(Rank)
    }
}
