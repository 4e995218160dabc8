//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `reports.csv`
//! - `snapshots.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, ReportRow, SnapshotRow};

/// Writes progress reports and road snapshots to two CSV files.
pub struct CsvWriter {
    reports:   Writer<File>,
    snapshots: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut reports = Writer::from_path(dir.join("reports.csv"))?;
        reports.write_record(["tick", "moved", "total_cars", "velocity"])?;

        let mut snapshots = Writer::from_path(dir.join("snapshots.csv"))?;
        snapshots.write_record(["tick", "cars", "cells"])?;

        Ok(Self {
            reports,
            snapshots,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_report(&mut self, row: &ReportRow) -> OutputResult<()> {
        self.reports.write_record(&[
            row.tick.to_string(),
            row.moved.to_string(),
            row.total_cars.to_string(),
            row.velocity.to_string(),
        ])?;
        Ok(())
    }

    fn write_snapshot(&mut self, row: &SnapshotRow) -> OutputResult<()> {
        self.snapshots.write_record(&[
            row.tick.to_string(),
            row.cars.to_string(),
            row.cells.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.reports.flush()?;
        self.snapshots.flush()?;
        Ok(())
    }
}
