//! The coordinator role played by rank 0.

use std::time::Instant;

use tracing::{debug, info};

use ca_comm::ExchangeStats;
use ca_core::{CommMode, Road, SimConfig, Tick};

use crate::{RunInfo, RunSummary, SimObserver, StepReport};

/// State that exists only on rank 0 for the duration of one run.
///
/// Owns a private copy of the initial road (the source for scatter) and turns
/// reduced totals into reports for the observer.  A fresh coordinator is
/// built for every run; nothing here outlives [`Sim::run`][crate::Sim::run].
pub struct Coordinator<'o, O: SimObserver> {
    road:       Road,
    config:     SimConfig,
    mode:       Option<CommMode>,
    observer:   &'o mut O,
    info:       Option<RunInfo>,
    reports:    Vec<StepReport>,
    started:    Option<Instant>,
}

impl<'o, O: SimObserver> Coordinator<'o, O> {
    pub fn new(road: Road, config: SimConfig, mode: Option<CommMode>, observer: &'o mut O) -> Self {
        Self {
            road,
            config,
            mode,
            observer,
            info:    None,
            reports: Vec::new(),
            started: None,
        }
    }

    /// The full road to scatter.
    #[inline]
    pub fn road(&self) -> &Road {
        &self.road
    }

    /// Record the reduced initial car count and start the clock.
    pub fn begin(&mut self, total_cars: u64) {
        let info = RunInfo::new(&self.config, self.mode, total_cars);
        info!(
            cells = info.road_length,
            timesteps = info.timesteps,
            density = info.density,
            initial_density = self.road.density(),
            workers = info.workers,
            mode = ?info.mode,
            total_cars,
            "simulation starting"
        );
        self.observer.on_start(&info);
        self.info = Some(info);
        self.started = Some(Instant::now());
    }

    #[inline]
    pub fn total_cars(&self) -> u64 {
        self.info.as_ref().map_or(0, |i| i.total_cars)
    }

    /// Turn a reduced moved-car count into a report.
    pub fn report(&mut self, tick: Tick, moved: u64) -> StepReport {
        let report = StepReport::new(tick, moved, self.total_cars());
        debug!(tick = tick.0, moved, velocity = report.velocity, "step report");
        self.observer.on_report(&report);
        self.reports.push(report);
        report
    }

    pub fn snapshot(&mut self, tick: Tick, road: &Road) {
        self.observer.on_snapshot(tick, road);
    }

    /// Close the run and hand the summary to the observer.
    pub fn finish(self, final_road: Road, exchange: Vec<ExchangeStats>) -> RunSummary {
        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        let info = self
            .info
            .unwrap_or_else(|| RunInfo::new(&self.config, self.mode, self.road.car_count()));
        info!(elapsed_secs = elapsed.as_secs_f64(), reports = self.reports.len(), "simulation finished");

        let summary = RunSummary {
            info,
            reports: self.reports,
            final_road,
            elapsed,
            exchange,
        };
        self.observer.on_sim_end(&summary);
        summary
    }
}
