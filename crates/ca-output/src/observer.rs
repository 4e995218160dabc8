//! `ReportObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use ca_core::{Road, Tick};
use ca_sim::{RunInfo, RunSummary, SimObserver, StepReport};

use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult, ReportRow, SnapshotRow};

/// A [`SimObserver`] that forwards reports and snapshots to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct ReportObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> ReportObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect output after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            self.last_error.get_or_insert(e);
        }
    }
}

impl<W: OutputWriter> SimObserver for ReportObserver<W> {
    fn on_start(&mut self, info: &RunInfo) {
        let result = self.writer.write_start(info);
        self.store_err(result);
    }

    fn on_report(&mut self, report: &StepReport) {
        let result = self.writer.write_report(&ReportRow::from(report));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, road: &Road) {
        let result = self.writer.write_snapshot(&SnapshotRow::new(tick, road));
        self.store_err(result);
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        let result = self.writer.write_end(summary);
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
