//! Plain data row types written by output backends.

use ca_core::{Road, Tick};
use ca_sim::StepReport;

/// One progress record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRow {
    pub tick:       u64,
    pub moved:      u64,
    pub total_cars: u64,
    /// `moved / total_cars`; 0 on an empty road.
    pub velocity:   f64,
}

impl From<&StepReport> for ReportRow {
    fn from(report: &StepReport) -> Self {
        Self {
            tick:       report.tick.0,
            moved:      report.moved,
            total_cars: report.total_cars,
            velocity:   report.velocity,
        }
    }
}

/// The whole road after a snapshot tick, as a `0`/`1` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub tick:  u64,
    pub cars:  u64,
    pub cells: String,
}

impl SnapshotRow {
    pub fn new(tick: Tick, road: &Road) -> Self {
        Self { tick: tick.0, cars: road.car_count(), cells: road.to_string() }
    }
}
