//! One worker's share of the road.

use ca_comm::{Boundary, Ghosts};
use ca_core::{Cell, count_cars};
use ca_partition::SegmentSpan;

use crate::rule::step_segment;
use crate::{DoubleBuffer, SimError, SimResult};

/// Cells owned by a single worker, plus the ghosts copied in from its
/// neighbours for the current step.
#[derive(Clone, Debug)]
pub struct LocalSegment {
    span:    SegmentSpan,
    buffers: DoubleBuffer,
    ghosts:  Ghosts,
}

impl LocalSegment {
    /// Take ownership of the cells received from the distributor.
    pub fn new(span: SegmentSpan, cells: Vec<Cell>) -> SimResult<Self> {
        if cells.len() != span.len || cells.is_empty() {
            return Err(SimError::SegmentLength {
                expected: span.len,
                got:      cells.len(),
                what:     "received segment",
            });
        }
        Ok(Self {
            span,
            buffers: DoubleBuffer::new(cells),
            ghosts:  Ghosts::default(),
        })
    }

    /// Global offset of the first owned cell.
    #[inline]
    pub fn offset(&self) -> usize {
        self.span.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.span.len
    }

    /// Current cells.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        self.buffers.current()
    }

    /// Cells to hand to the neighbours this step.
    #[inline]
    pub fn boundary(&self) -> Boundary {
        Boundary::of(self.buffers.current())
    }

    pub fn set_ghosts(&mut self, ghosts: Ghosts) {
        self.ghosts = ghosts;
    }

    /// Fill the next buffer from the current one and the ghosts.  Returns the
    /// local moved-car count.
    pub fn evaluate(&mut self) -> u64 {
        let ghosts = self.ghosts;
        let (current, next) = self.buffers.split();
        step_segment(current, next, ghosts)
    }

    pub fn swap(&mut self) {
        self.buffers.swap();
    }

    /// Steps completed so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.buffers.generation()
    }

    pub fn car_count(&self) -> u64 {
        count_cars(self.buffers.current())
    }
}
