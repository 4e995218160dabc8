//! Line-oriented `key=value` records for a terminal or log file.

use std::io::Write;

use ca_sim::{RunInfo, RunSummary};

use crate::writer::OutputWriter;
use crate::{OutputResult, ReportRow, SnapshotRow};

/// Writes one record per line:
///
/// ```text
/// road_length=1000 timesteps=5000 density=0.50 workers=4 mode=async cars=497
/// timestep=0 velocity=0.5151
/// …
/// elapsed_secs=0.012345
/// ```
///
/// Snapshots are written only when enabled with
/// [`with_snapshots`][Self::with_snapshots].
pub struct TextWriter<W: Write> {
    out:       W,
    snapshots: bool,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, snapshots: false }
    }

    pub fn with_snapshots(mut self, enabled: bool) -> Self {
        self.snapshots = enabled;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputWriter for TextWriter<W> {
    fn write_start(&mut self, info: &RunInfo) -> OutputResult<()> {
        let mode = info.mode.map_or_else(|| "sequential".to_string(), |m| m.to_string());
        writeln!(
            self.out,
            "road_length={} timesteps={} density={:.2} workers={} mode={} cars={}",
            info.road_length, info.timesteps, info.density, info.workers, mode, info.total_cars
        )?;
        Ok(())
    }

    fn write_report(&mut self, row: &ReportRow) -> OutputResult<()> {
        writeln!(self.out, "timestep={} velocity={:.4}", row.tick, row.velocity)?;
        Ok(())
    }

    fn write_snapshot(&mut self, row: &SnapshotRow) -> OutputResult<()> {
        if self.snapshots {
            writeln!(self.out, "snapshot timestep={} cars={} cells={}", row.tick, row.cars, row.cells)?;
        }
        Ok(())
    }

    fn write_end(&mut self, summary: &RunSummary) -> OutputResult<()> {
        writeln!(self.out, "elapsed_secs={:.6}", summary.elapsed.as_secs_f64())?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
