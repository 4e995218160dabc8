//! One worker's step loop and its phase state machine.

use tracing::{debug, trace, trace_span};

use ca_comm::{CommError, Endpoint, ExchangeStats, HaloExchange, Transport};
use ca_core::{Rank, Road, SimConfig, Tick};
use ca_partition::PartitionLayout;

use crate::{Coordinator, LocalSegment, SimError, SimObserver, SimResult};

// ── WorkerPhase ───────────────────────────────────────────────────────────────

/// Where a worker is within a timestep.
///
/// ```text
/// Initialized → Exchange → Evaluate → (Report) → Swap → Exchange → …
///                                                   └──→ Finalize
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum WorkerPhase {
    Initialized,
    Exchange,
    Evaluate,
    Report,
    Swap,
    Finalize,
}

impl WorkerPhase {
    /// Whether `self → next` is a legal transition.
    pub fn can_advance_to(self, next: WorkerPhase) -> bool {
        use WorkerPhase::*;
        matches!(
            (self, next),
            (Initialized, Exchange)
                | (Initialized, Finalize)
                | (Exchange, Evaluate)
                | (Evaluate, Report)
                | (Evaluate, Swap)
                | (Report, Swap)
                | (Swap, Exchange)
                | (Swap, Finalize)
        )
    }
}

// ── Worker ────────────────────────────────────────────────────────────────────

/// What a worker hands back when its loop ends.
#[derive(Debug)]
pub(crate) struct WorkerOutcome {
    pub(crate) rank:       Rank,
    pub(crate) exchange:   ExchangeStats,
    /// The reassembled road; only the coordinator has one.
    pub(crate) final_road: Option<Road>,
}

/// A worker owns its endpoint, its copy of the layout and its strategy.
/// Nothing in here is shared with any other worker.
pub(crate) struct Worker<H: HaloExchange> {
    endpoint: Endpoint,
    config:   SimConfig,
    layout:   PartitionLayout,
    strategy: H,
    phase:    WorkerPhase,
}

impl<H: HaloExchange> Worker<H> {
    pub(crate) fn new(endpoint: Endpoint, config: SimConfig, layout: PartitionLayout, strategy: H) -> Self {
        Self {
            endpoint,
            config,
            layout,
            strategy,
            phase: WorkerPhase::Initialized,
        }
    }

    #[inline]
    pub(crate) fn rank(&self) -> Rank {
        self.endpoint.rank()
    }

    fn advance(&mut self, next: WorkerPhase, tick: Tick) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal phase transition {:?} -> {next:?}",
            self.phase
        );
        trace!(tick = tick.0, from = ?self.phase, to = ?next, "phase");
        self.phase = next;
    }

    /// Run every timestep.  Rank 0 passes its coordinator; everyone else
    /// passes `None`.
    ///
    /// Returning early with an error drops the endpoint, which disconnects
    /// this worker from its neighbours and the coordinator and so aborts
    /// the rest of the ring.
    pub(crate) fn run<O: SimObserver>(
        mut self,
        mut coordinator: Option<&mut Coordinator<'_, O>>,
    ) -> SimResult<WorkerOutcome> {
        let rank = self.rank();
        let span = trace_span!("worker", rank = rank.0, strategy = self.strategy.name());
        let _enter = span.enter();
        let comm = move |source: CommError| SimError::Comm { rank, source };

        // ── Initialized: receive our segment and count cars ──────────────
        let own = self.layout.segment(rank)?;
        let road = coordinator.as_deref().map(Coordinator::road);
        let cells = self.endpoint.scatter(road, &self.layout).map_err(&comm)?;
        let mut segment = LocalSegment::new(own, cells)?;
        debug!(offset = segment.offset(), len = segment.len(), "segment received");

        let total = self.endpoint.reduce_sum(segment.car_count()).map_err(&comm)?;
        if let (Some(c), Some(total)) = (coordinator.as_deref_mut(), total) {
            c.begin(total);
        }

        // ── Step loop ─────────────────────────────────────────────────────
        for t in 0..self.config.timesteps {
            let tick = Tick(t);

            self.advance(WorkerPhase::Exchange, tick);
            let ghosts = self
                .strategy
                .exchange(&self.endpoint, segment.boundary())
                .map_err(&comm)?;
            segment.set_ghosts(ghosts);

            self.advance(WorkerPhase::Evaluate, tick);
            let moved = segment.evaluate();

            if self.config.is_report_tick(tick) {
                self.advance(WorkerPhase::Report, tick);
                let global = self.endpoint.reduce_sum(moved).map_err(&comm)?;
                if let (Some(c), Some(global)) = (coordinator.as_deref_mut(), global) {
                    c.report(tick, global);
                }
            }

            self.advance(WorkerPhase::Swap, tick);
            segment.swap();

            if self.config.is_snapshot_tick(tick) {
                let road = self.endpoint.gather(segment.cells(), &self.layout).map_err(&comm)?;
                if let (Some(c), Some(road)) = (coordinator.as_deref_mut(), road) {
                    c.snapshot(tick, &road);
                }
            }
        }

        // ── Finalize ──────────────────────────────────────────────────────
        self.advance(WorkerPhase::Finalize, self.config.end_tick());
        let final_road = self.endpoint.gather(segment.cells(), &self.layout).map_err(&comm)?;
        debug!(steps = segment.generation(), cars = segment.car_count(), "worker finished");

        Ok(WorkerOutcome {
            rank,
            exchange: self.strategy.stats(),
            final_road,
        })
    }
}
