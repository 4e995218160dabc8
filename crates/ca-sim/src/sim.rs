//! The `Sim` struct: spawns one thread per rank and drives a run.

use std::thread;

use tracing::warn;

use ca_comm::{AsyncExchange, CommConfig, Fabric, HaloExchange, ParityExchange, Transport};
use ca_core::{CommMode, Rank, Road, SimConfig};
use ca_partition::PartitionLayout;

use crate::worker::{Worker, WorkerOutcome};
use crate::{Coordinator, NoopObserver, RunSummary, SimError, SimObserver, SimResult};

/// A validated, ready-to-run distributed simulation.
///
/// `Sim` holds only immutable inputs.  Every call to [`run`][Self::run]
/// builds a fresh fabric, a fresh coordinator and fresh workers, so the same
/// `Sim` can be run repeatedly (e.g. once per strategy) from the same
/// initial road.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
#[derive(Clone, Debug)]
pub struct Sim {
    pub config: SimConfig,
    pub layout: PartitionLayout,
    /// Initial road; copied into the coordinator at the start of each run.
    pub road:   Road,
    pub comm:   CommConfig,
}

impl Sim {
    /// Run all timesteps with the strategy selected by `config.mode`.
    pub fn run<O: SimObserver>(&self, observer: &mut O) -> SimResult<RunSummary> {
        match self.config.mode {
            CommMode::Async => self.run_with(AsyncExchange::default(), observer),
            CommMode::Sync  => self.run_with(ParityExchange::default(), observer),
        }
    }

    /// Run all timesteps with an explicit halo strategy.
    ///
    /// Rank 0 runs on the calling thread and owns the observer; ranks
    /// `1..P` run on scoped threads.  If any rank fails, the others are
    /// unblocked by disconnection and the first error that is not merely a
    /// disconnection is returned.
    pub fn run_with<H, O>(&self, strategy: H, observer: &mut O) -> SimResult<RunSummary>
    where
        H: HaloExchange,
        O: SimObserver,
    {
        let mut endpoints = Fabric::ring(self.layout.workers(), self.comm)
            .map_err(|source| SimError::Comm { rank: Rank::ROOT, source })?
            .into_iter();
        let Some(root_endpoint) = endpoints.next() else {
            return Err(SimError::Config("a run needs at least one worker".into()));
        };

        let mut coordinator =
            Coordinator::new(self.road.clone(), self.config.clone(), Some(self.config.mode), observer);

        let (root, others) = thread::scope(|s| {
            let mut handles = Vec::with_capacity(self.layout.workers().saturating_sub(1));
            let mut spawn_error = None;

            for endpoint in endpoints.by_ref() {
                let rank = endpoint.rank();
                let worker = Worker::new(endpoint, self.config.clone(), self.layout.clone(), strategy.clone());
                let spawned = thread::Builder::new()
                    .name(format!("ca-worker-{}", rank.0))
                    .spawn_scoped(s, move || worker.run::<NoopObserver>(None));
                match spawned {
                    Ok(handle) => handles.push((rank, handle)),
                    Err(source) => {
                        spawn_error = Some(SimError::Spawn { rank, source });
                        break;
                    }
                }
            }
            // Unspawned ranks drop here, before anyone blocks on them.
            drop(endpoints);

            let root = match spawn_error {
                Some(err) => {
                    drop(root_endpoint);
                    Err(err)
                }
                None => Worker::new(root_endpoint, self.config.clone(), self.layout.clone(), strategy)
                    .run(Some(&mut coordinator)),
            };

            // A panicking worker unwinds and drops its endpoint, so its peers fail
            // with disconnections and the join reports the panic.
            let others: Vec<SimResult<WorkerOutcome>> = handles
                .into_iter()
                .map(|(rank, handle)| handle.join().unwrap_or(Err(SimError::WorkerPanicked(rank))))
                .collect();
            (root, others)
        });

        let mut outcomes = Vec::with_capacity(self.layout.workers());
        let mut errors = Vec::new();
        for result in std::iter::once(root).chain(others) {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => errors.push(err),
            }
        }
        if let Some(err) = root_cause(errors) {
            warn!(error = %err, "run aborted");
            return Err(err);
        }

        outcomes.sort_by_key(|o| o.rank);
        let exchange = outcomes.iter().map(|o| o.exchange).collect();
        let final_road = outcomes
            .into_iter()
            .find_map(|o| o.final_road)
            .ok_or_else(|| SimError::Config("coordinator gathered no final road".into()))?;

        Ok(coordinator.finish(final_road, exchange))
    }
}

/// Pick the error that explains an aborted run.
///
/// A failure on one rank makes its neighbours fail with disconnections, so
/// the first non-disconnect error wins; if every error is a disconnection,
/// the first one is returned.
pub(crate) fn root_cause(errors: Vec<SimError>) -> Option<SimError> {
    let mut first_disconnect = None;
    for err in errors {
        if !err.is_disconnect() {
            return Some(err);
        }
        first_disconnect.get_or_insert(err);
    }
    first_disconnect
}
