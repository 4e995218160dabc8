//! Integration tests for ca-output.

use std::time::Duration;

use ca_core::{CommMode, Road, Tick};
use ca_sim::{RunInfo, RunSummary, StepReport};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn info(mode: Option<CommMode>) -> RunInfo {
    RunInfo {
        road_length: 10,
        timesteps:   3,
        density:     0.5,
        workers:     2,
        mode,
        total_cars:  5,
    }
}

fn report(tick: u64, moved: u64) -> StepReport {
    StepReport::new(Tick(tick), moved, 5)
}

fn summary() -> RunSummary {
    RunSummary {
        info:       info(Some(CommMode::Async)),
        reports:    vec![report(0, 5)],
        final_road: "0101010101".parse().unwrap(),
        elapsed:    Duration::from_millis(1500),
        exchange:   Vec::new(),
    }
}

fn road(s: &str) -> Road {
    s.parse().unwrap()
}

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use super::{report, road};
    use crate::csv::CsvWriter;
    use crate::row::{ReportRow, SnapshotRow};
    use crate::writer::OutputWriter;
    use ca_core::Tick;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("reports.csv").exists());
        assert!(dir.path().join("snapshots.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("reports.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["tick", "moved", "total_cars", "velocity"]);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("snapshots.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, ["tick", "cars", "cells"]);
    }

    #[test]
    fn csv_reports_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_report(&ReportRow::from(&report(0, 5))).unwrap();
        w.write_report(&ReportRow::from(&report(1, 2))).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("reports.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[0][3], "1");   // velocity 5 / 5
        assert_eq!(&rows[1][1], "2");
        assert_eq!(&rows[1][3], "0.4");
    }

    #[test]
    fn csv_snapshot_keeps_cells_as_text() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshot(&SnapshotRow::new(Tick(4), &road("0011"))).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][1], "2");
        assert_eq!(&rows[0][2], "0011");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_dir_errors() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("does-not-exist")).is_err());
    }
}

#[cfg(test)]
mod text_tests {
    use ca_core::CommMode;

    use super::{info, report, summary};
    use crate::row::ReportRow;
    use crate::text::TextWriter;
    use crate::writer::OutputWriter;

    fn lines(w: TextWriter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(w.into_inner()).unwrap().lines().map(str::to_owned).collect()
    }

    #[test]
    fn header_names_the_run() {
        let mut w = TextWriter::new(Vec::new());
        w.write_start(&info(Some(CommMode::Sync))).unwrap();
        assert_eq!(lines(w), ["road_length=10 timesteps=3 density=0.50 workers=2 mode=sync cars=5"]);
    }

    #[test]
    fn sequential_header_has_no_mode() {
        let mut w = TextWriter::new(Vec::new());
        w.write_start(&info(None)).unwrap();
        assert!(lines(w)[0].contains("mode=sequential"));
    }

    #[test]
    fn report_and_elapsed_records() {
        let mut w = TextWriter::new(Vec::new());
        w.write_report(&ReportRow::from(&report(0, 5))).unwrap();
        w.write_report(&ReportRow::from(&report(2, 1))).unwrap();
        w.write_end(&summary()).unwrap();
        w.finish().unwrap();
        assert_eq!(lines(w), [
            "timestep=0 velocity=1.0000",
            "timestep=2 velocity=0.2000",
            "elapsed_secs=1.500000",
        ]);
    }

    #[test]
    fn snapshots_hidden_unless_enabled() {
        use ca_core::Tick;

        use crate::row::SnapshotRow;

        let row = SnapshotRow::new(Tick(1), &super::road("10"));

        let mut quiet = TextWriter::new(Vec::new());
        quiet.write_snapshot(&row).unwrap();
        assert!(lines(quiet).is_empty());

        let mut loud = TextWriter::new(Vec::new()).with_snapshots(true);
        loud.write_snapshot(&row).unwrap();
        assert_eq!(lines(loud), ["snapshot timestep=1 cars=1 cells=10"]);
    }
}

#[cfg(test)]
mod observer_tests {
    use std::io;

    use ca_core::{CommMode, SimConfig};
    use ca_sim::{SimBuilder, SimObserver};

    use super::{info, report, summary};
    use crate::{OutputError, ReportObserver, TextWriter};

    /// A sink that refuses every write.
    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn forwards_every_callback() {
        let mut obs = ReportObserver::new(TextWriter::new(Vec::new()));
        obs.on_start(&info(Some(CommMode::Async)));
        obs.on_report(&report(0, 5));
        obs.on_sim_end(&summary());
        assert!(obs.take_error().is_none());

        let text = String::from_utf8(obs.into_writer().into_inner()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().nth(1).unwrap().starts_with("timestep=0"));
    }

    #[test]
    fn stores_first_error_only() {
        let mut obs = ReportObserver::new(TextWriter::new(Broken));
        obs.on_report(&report(0, 5));
        obs.on_report(&report(1, 5));
        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
    }

    #[test]
    fn drives_a_real_run() {
        let config = SimConfig {
            road_length:     20,
            timesteps:       5,
            workers:         2,
            report_interval: 2,
            ..SimConfig::default()
        };
        let sim = SimBuilder::new(config).build().unwrap();
        let mut obs = ReportObserver::new(TextWriter::new(Vec::new()));
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none());

        let text = String::from_utf8(obs.into_writer().into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // header, ticks 0 2 4, elapsed
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("road_length=20 "));
        assert!(lines[3].starts_with("timestep=4 "));
        assert!(lines[4].starts_with("elapsed_secs="));
    }
}
