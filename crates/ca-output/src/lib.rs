//! `ca-output`: report and snapshot writers for the rust_ca automaton.
//!
//! | Backend      | Destination                                 |
//! |--------------|---------------------------------------------|
//! | `TextWriter` | any `io::Write`, one `key=value` line each  |
//! | `CsvWriter`  | `reports.csv`, `snapshots.csv` in a dir     |
//!
//! Both implement [`OutputWriter`] and are driven by [`ReportObserver`],
//! which implements `ca_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ca_output::{ReportObserver, TextWriter};
//!
//! let mut obs = ReportObserver::new(TextWriter::new(std::io::stdout().lock()));
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod text;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ReportObserver;
pub use row::{ReportRow, SnapshotRow};
pub use text::TextWriter;
pub use writer::OutputWriter;
