//! Simulation observer trait for progress reporting and data collection.

use ca_core::{Road, Tick};

use crate::{RunInfo, RunSummary, StepReport};

/// Callbacks invoked on the coordinator at key points of a run.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers never run on worker threads and
/// need not be `Send`.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter;
///
/// impl SimObserver for ProgressPrinter {
///     fn on_report(&mut self, report: &StepReport) {
///         println!("timestep={} velocity={:.4}", report.tick.0, report.velocity);
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called once after the initial car count is known, before step 0.
    fn on_start(&mut self, _info: &RunInfo) {}

    /// Called on every report tick (every `report_interval` ticks and the
    /// final tick).
    fn on_report(&mut self, _report: &StepReport) {}

    /// Called on snapshot ticks with the reassembled road *after* `tick`
    /// was applied.
    fn on_snapshot(&mut self, _tick: Tick, _road: &Road) {}

    /// Called once after the final step and gather.
    fn on_sim_end(&mut self, _summary: &RunSummary) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
