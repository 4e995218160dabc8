//! Message tags and coordinator-link payloads.

use std::fmt;

use ca_core::Cell;

/// Direction a halo value travels along the ring.
///
/// Tags keep the two halo channels between a pair of ranks apart, which
/// matters when both neighbours are the same peer (`P = 2`) or the rank
/// itself (`P = 1`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Tag {
    /// A segment's last cell, sent to the right neighbour, which stores it
    /// as its left ghost.
    Rightward,
    /// A segment's first cell, sent to the left neighbour, which stores it
    /// as its right ghost.
    Leftward,
}

impl Tag {
    pub const ALL: [Tag; 2] = [Tag::Rightward, Tag::Leftward];
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tag::Rightward => "rightward",
            Tag::Leftward  => "leftward",
        };
        f.write_str(s)
    }
}

/// Worker → coordinator payload.
///
/// Each worker's uplink is FIFO, so the coordinator receives reductions and
/// gathered segments in the order the worker produced them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Uplink {
    /// One summand of a `reduce_sum`.
    Count(u64),
    /// One rank's cells for a `gather`.
    Segment(Vec<Cell>),
}
