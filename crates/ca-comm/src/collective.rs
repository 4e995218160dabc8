//! Coordinator collectives: scatter, reduce and gather.
//!
//! Every collective is called by all ranks.  The coordinator (rank 0) talks
//! to each worker over that worker's private downlink / uplink; workers never
//! talk to each other here.  Worker-side sends are buffered, so a worker
//! leaves `reduce_sum` and `gather` as soon as its value is queued and only
//! the coordinator waits.

use tracing::debug;

use ca_core::{Cell, Rank, Road};
use ca_partition::PartitionLayout;

use crate::fabric::CoordinatorLink;
use crate::{CommError, CommResult, Endpoint, Op, Transport, Uplink};

impl Endpoint {
    /// Distribute the road so every rank ends up with its own segment.
    ///
    /// The coordinator passes `Some(road)`; every other rank passes `None`.
    /// All ranks pass the same `layout`, and each rank checks that it
    /// received exactly `layout.counts()[rank]` cells.
    pub fn scatter(&self, road: Option<&Road>, layout: &PartitionLayout) -> CommResult<Vec<Cell>> {
        let own = layout.segment(self.rank())?;

        match &self.coordinator {
            CoordinatorLink::Root(links) => {
                let road = road.ok_or(CommError::MissingRootData { op: Op::Scatter })?;
                if road.len() != layout.cells() {
                    return Err(CommError::SizeMismatch {
                        peer:     self.rank(),
                        op:       Op::Scatter,
                        expected: layout.cells(),
                        got:      road.len(),
                    });
                }

                for ((rank, span), tx) in layout.segments().skip(1).zip(&links.downlinks) {
                    let cells = road.cells()[span.range()].to_vec();
                    self.send_to(tx, cells, rank, Op::Scatter)?;
                }
                debug!(workers = layout.workers(), cells = layout.cells(), "road scattered");
                Ok(road.cells()[own.range()].to_vec())
            }
            CoordinatorLink::Worker(links) => {
                let cells = self.recv_from(&links.downlink, Rank::ROOT, Op::Scatter)?;
                if cells.len() != own.len {
                    return Err(CommError::SizeMismatch {
                        peer:     Rank::ROOT,
                        op:       Op::Scatter,
                        expected: own.len,
                        got:      cells.len(),
                    });
                }
                Ok(cells)
            }
        }
    }

    /// Sum one value per rank at the coordinator.
    ///
    /// Returns `Some(total)` on the coordinator and `None` everywhere else.
    pub fn reduce_sum(&self, value: u64) -> CommResult<Option<u64>> {
        match &self.coordinator {
            CoordinatorLink::Root(links) => {
                let mut total = value;
                for (r, rx) in links.uplinks.iter().enumerate() {
                    let peer = Rank(r as u32 + 1);
                    match self.recv_from(rx, peer, Op::Reduce)? {
                        Uplink::Count(v) => total += v,
                        Uplink::Segment(_) => {
                            return Err(CommError::Unexpected {
                                peer,
                                op:       Op::Reduce,
                                expected: "count",
                            });
                        }
                    }
                }
                Ok(Some(total))
            }
            CoordinatorLink::Worker(links) => {
                self.send_to(&links.uplink, Uplink::Count(value), Rank::ROOT, Op::Reduce)?;
                Ok(None)
            }
        }
    }

    /// Reassemble the full road at the coordinator.
    ///
    /// Returns `Some(road)` on the coordinator and `None` everywhere else.
    /// A segment whose length disagrees with `layout` is fatal.
    pub fn gather(&self, segment: &[Cell], layout: &PartitionLayout) -> CommResult<Option<Road>> {
        match &self.coordinator {
            CoordinatorLink::Root(links) => {
                let own = layout.segment(self.rank())?;
                if segment.len() != own.len {
                    return Err(CommError::SizeMismatch {
                        peer:     self.rank(),
                        op:       Op::Gather,
                        expected: own.len,
                        got:      segment.len(),
                    });
                }

                let mut cells = Vec::with_capacity(layout.cells());
                cells.extend_from_slice(segment);
                for ((rank, span), rx) in layout.segments().skip(1).zip(&links.uplinks) {
                    let part = match self.recv_from(rx, rank, Op::Gather)? {
                        Uplink::Segment(part) => part,
                        Uplink::Count(_) => {
                            return Err(CommError::Unexpected {
                                peer:     rank,
                                op:       Op::Gather,
                                expected: "segment",
                            });
                        }
                    };
                    if part.len() != span.len {
                        return Err(CommError::SizeMismatch {
                            peer:     rank,
                            op:       Op::Gather,
                            expected: span.len,
                            got:      part.len(),
                        });
                    }
                    cells.extend(part);
                }
                Ok(Some(Road::from_cells(cells)))
            }
            CoordinatorLink::Worker(links) => {
                self.send_to(&links.uplink, Uplink::Segment(segment.to_vec()), Rank::ROOT, Op::Gather)?;
                Ok(None)
            }
        }
    }
}
