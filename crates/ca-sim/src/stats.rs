//! Run metadata, progress reports and the end-of-run summary.

use std::time::Duration;

use ca_comm::ExchangeStats;
use ca_core::{CommMode, Road, SimConfig, Tick};

/// Fraction of cars that advanced in a step.  0 when there are no cars.
#[inline]
pub fn velocity(moved: u64, total_cars: u64) -> f64 {
    if total_cars == 0 {
        0.0
    } else {
        moved as f64 / total_cars as f64
    }
}

/// Parameters of a run, announced once before the first step.
#[derive(Clone, Debug, PartialEq)]
pub struct RunInfo {
    pub road_length: usize,
    pub timesteps:   u64,
    pub density:     f64,
    pub workers:     usize,
    /// `None` for the sequential loop.
    pub mode:        Option<CommMode>,
    pub total_cars:  u64,
}

impl RunInfo {
    pub fn new(config: &SimConfig, mode: Option<CommMode>, total_cars: u64) -> Self {
        Self {
            road_length: config.road_length,
            timesteps:   config.timesteps,
            density:     config.density,
            workers:     config.workers,
            mode,
            total_cars,
        }
    }
}

/// One progress record produced on a report tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepReport {
    pub tick:       Tick,
    /// Cars that moved during `tick`, summed over all workers.
    pub moved:      u64,
    pub total_cars: u64,
    pub velocity:   f64,
}

impl StepReport {
    pub fn new(tick: Tick, moved: u64, total_cars: u64) -> Self {
        Self { tick, moved, total_cars, velocity: velocity(moved, total_cars) }
    }
}

/// What a completed run hands back to the caller.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub info:       RunInfo,
    pub reports:    Vec<StepReport>,
    /// Road state after the last step, reassembled at the coordinator.
    pub final_road: Road,
    /// Wall-clock time from first exchange to final gather.
    pub elapsed:    Duration,
    /// Halo operation counts per rank (empty for the sequential loop).
    pub exchange:   Vec<ExchangeStats>,
}

impl RunSummary {
    /// The report for the last simulated tick.
    pub fn final_report(&self) -> Option<&StepReport> {
        self.reports.last()
    }
}
