//! The `OutputWriter` trait implemented by all backend writers.

use ca_sim::{RunInfo, RunSummary};

use crate::{OutputResult, ReportRow, SnapshotRow};

/// Trait implemented by the CSV and text writers.
///
/// All methods are infallible from the observer's perspective; errors are
/// stored internally and retrieved with [`ReportObserver::take_error`].
///
/// [`ReportObserver::take_error`]: crate::ReportObserver::take_error
pub trait OutputWriter {
    /// Announce the run before the first step.
    fn write_start(&mut self, _info: &RunInfo) -> OutputResult<()> {
        Ok(())
    }

    /// Write one progress record.
    fn write_report(&mut self, row: &ReportRow) -> OutputResult<()>;

    /// Write one reassembled road.
    fn write_snapshot(&mut self, row: &SnapshotRow) -> OutputResult<()>;

    /// Close the run with its summary (elapsed time, final road).
    fn write_end(&mut self, _summary: &RunSummary) -> OutputResult<()> {
        Ok(())
    }

    /// Flush and close all underlying handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
