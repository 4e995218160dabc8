//! Strongly typed worker identifier.
//!
//! `Rank` is `Copy + Ord + Hash` so it can key maps and order collections
//! without ceremony.  The inner integer is `pub`, but callers should prefer
//! [`Rank::index`] when indexing per-rank tables.

use std::fmt;

/// Position of a worker on the ring, `0..P`.  Rank 0 is the coordinator.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rank(pub u32);

impl Rank {
    /// The coordinator rank.
    pub const ROOT: Rank = Rank(0);

    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }

    /// Parity class used by the ordered blocking exchange.
    #[inline]
    pub fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rank({})", self.0)
    }
}
