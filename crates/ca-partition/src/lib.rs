//! `ca-partition`: splits a road of N cells across P workers.
//!
//! Every worker owns one contiguous, non-empty segment.  The first `N mod P`
//! ranks take one extra cell, so lengths differ by at most one and the
//! segments tile the road in rank order.
//!
//! | Type                | Role                                               |
//! |---------------------|----------------------------------------------------|
//! | [`PartitionLayout`] | Per-rank `counts` / `offsets` tables               |
//! | [`SegmentSpan`]     | One rank's `(offset, len)` view                    |
//! | [`Topology`]        | Ring neighbours: `left(r)`, `right(r)`             |
//!
//! The coordinator and every worker build the same layout from `(N, P)`; the
//! distributor relies on that to check received segment sizes.

pub mod error;
pub mod layout;
pub mod topology;


pub use error::{PartitionError, PartitionResult};
pub use layout::{PartitionLayout, SegmentSpan};
pub use topology::Topology;
