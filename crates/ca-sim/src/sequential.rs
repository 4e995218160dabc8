//! Single-threaded reference loop.

use tracing::debug;

use ca_core::{Road, SimConfig, Tick};

use crate::rule::step_ring;
use crate::{Coordinator, DoubleBuffer, RunSummary, SimObserver, SimResult};

/// Advances the whole road on the calling thread with [`step_ring`].
///
/// Produces the same observer callbacks as [`Sim`][crate::Sim] so the two
/// can be compared report for report and snapshot for snapshot.
#[derive(Clone, Debug)]
pub struct SequentialSim {
    pub config: SimConfig,
    pub road:   Road,
}

impl SequentialSim {
    pub fn new(config: SimConfig, road: Road) -> Self {
        Self { config, road }
    }

    pub fn run<O: SimObserver>(&self, observer: &mut O) -> SimResult<RunSummary> {
        let mut coordinator = Coordinator::new(self.road.clone(), self.config.clone(), None, observer);
        let mut buffers = DoubleBuffer::new(self.road.cells().to_vec());
        coordinator.begin(self.road.car_count());

        for t in 0..self.config.timesteps {
            let tick = Tick(t);
            let (current, next) = buffers.split();
            let moved = step_ring(current, next);
            buffers.swap();

            if self.config.is_report_tick(tick) {
                coordinator.report(tick, moved);
            }
            if self.config.is_snapshot_tick(tick) {
                coordinator.snapshot(tick, &Road::from_cells(buffers.current().to_vec()));
            }
        }
        debug!(steps = buffers.generation(), "sequential run finished");

        Ok(coordinator.finish(Road::from_cells(buffers.into_current()), Vec::new()))
    }
}
