//! Near-equal contiguous partitioning.

use std::ops::Range;

use ca_core::Rank;

use crate::{PartitionError, PartitionResult};

/// One rank's slice of the global road.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct SegmentSpan {
    /// Global index of the segment's first cell.
    pub offset: usize,
    /// Number of cells owned.  Always at least 1.
    pub len:    usize,
}

impl SegmentSpan {
    /// Global index range covered by the segment.
    #[inline]
    pub fn range(self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Distribution tables for one `(N, P)` pair.
///
/// `counts[r]` is rank `r`'s segment length and `offsets[r]` its starting
/// global index.  Both tables are derived purely from `(N, P)`, so any two
/// parties that build a layout from the same inputs agree on every entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PartitionLayout {
    cells:   usize,
    counts:  Vec<usize>,
    offsets: Vec<usize>,
}

impl PartitionLayout {
    /// Split `cells` across `workers` ranks.
    ///
    /// Rank `r` receives `cells / workers + 1` cells when `r < cells % workers`
    /// and `cells / workers` otherwise; offsets are the running prefix sum.
    pub fn new(cells: usize, workers: usize) -> PartitionResult<Self> {
        if cells == 0 {
            return Err(PartitionError::EmptyRoad);
        }
        if workers == 0 {
            return Err(PartitionError::NoWorkers);
        }
        if workers > cells {
            return Err(PartitionError::TooManyWorkers { workers, cells });
        }

        let base      = cells / workers;
        let remainder = cells % workers;

        let mut counts  = Vec::with_capacity(workers);
        let mut offsets = Vec::with_capacity(workers);
        let mut offset  = 0;
        for rank in 0..workers {
            let len = if rank < remainder { base + 1 } else { base };
            counts.push(len);
            offsets.push(offset);
            offset += len;
        }
        debug_assert_eq!(offset, cells);

        Ok(Self { cells, counts, offsets })
    }

    /// Total road length N.
    #[inline]
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Worker count P.
    #[inline]
    pub fn workers(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    #[inline]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Segment owned by `rank`.
    pub fn segment(&self, rank: Rank) -> PartitionResult<SegmentSpan> {
        let r = rank.index();
        if r >= self.workers() {
            return Err(PartitionError::RankOutOfRange { rank: r, workers: self.workers() });
        }
        Ok(SegmentSpan { offset: self.offsets[r], len: self.counts[r] })
    }

    /// Iterate `(rank, span)` pairs in rank order.
    pub fn segments(&self) -> impl Iterator<Item = (Rank, SegmentSpan)> + '_ {
        self.counts
            .iter()
            .zip(&self.offsets)
            .enumerate()
            .map(|(r, (&len, &offset))| (Rank(r as u32), SegmentSpan { offset, len }))
    }
}
