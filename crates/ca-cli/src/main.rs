//! cars: traffic cellular automaton on a ring of workers.
//!
//! Cars sit on a circular road of N cells and advance one cell per step
//! when the cell ahead is free.  The road is split into contiguous
//! segments, one per worker thread, and neighbours trade boundary cells
//! every step.
//!
//! # Example
//!
//! ```bash
//! # 10 000 cells, 5 000 steps, density 0.4, 8 workers, parity exchange
//! cars 10000 5000 0.4 sync --workers 8
//!
//! # single-threaded reference run, reports also written to ./out/reports.csv
//! cars 1000 5000 0.5 --sequential --csv ./out
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `warn,ca_sim=info`).

use std::io::{self, StdoutLock};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ca_comm::Delivery;
use ca_core::{CommMode, Road, SimConfig, Tick};
use ca_output::{CsvWriter, OutputError, ReportObserver, TextWriter};
use ca_sim::{RunInfo, RunSummary, SimBuilder, SimObserver, StepReport};

/// Traffic cellular automaton
///
/// Prints `timestep=<t> velocity=<v>` every report interval and on the
/// final step, then `elapsed_secs=<s>`.
#[derive(Parser, Debug)]
#[command(name = "cars")]
#[command(version, about, long_about = None)]
struct Args {
    /// Road length N (cells)
    #[arg(default_value_t = 1_000)]
    road_length: usize,

    /// Number of timesteps T
    #[arg(default_value_t = 5_000)]
    timesteps: u64,

    /// Initial density D in (0, 1]
    #[arg(default_value_t = 0.5)]
    density: f64,

    /// Halo-exchange mode: async (post then wait) or sync (parity ordered)
    #[arg(default_value_t = CommMode::Async)]
    mode: CommMode,

    /// Number of worker threads P (1 <= P <= N).  Defaults to the available
    /// parallelism, capped at N.
    #[arg(short = 'p', long)]
    workers: Option<usize>,

    /// Seed for the initial road.  When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Report every N steps (the final step is always reported)
    #[arg(long, default_value_t = 1_000)]
    report_interval: u64,

    /// Gather and print the whole road every N steps (0 = never)
    #[arg(long, default_value_t = 0)]
    snapshot_interval: u64,

    /// Also write reports.csv and snapshots.csv into this directory
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Run the single-threaded reference loop instead of the worker ring
    #[arg(long)]
    sequential: bool,

    /// Fail if any message operation waits longer than this
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Run the sync strategy over buffered instead of rendezvous channels
    #[arg(long)]
    buffered: bool,
}

impl Args {
    fn config(&self) -> SimConfig {
        let workers = self.workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map_or(1, NonZeroUsize::get)
                .min(self.road_length.max(1))
        });
        SimConfig {
            road_length:       self.road_length,
            timesteps:         self.timesteps,
            density:           self.density,
            mode:              self.mode,
            workers,
            seed:              self.seed.unwrap_or_else(rand::random),
            report_interval:   self.report_interval,
            snapshot_interval: self.snapshot_interval,
        }
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Terminal output plus an optional CSV copy.
struct CliObserver<'a> {
    text: ReportObserver<TextWriter<StdoutLock<'a>>>,
    csv:  Option<ReportObserver<CsvWriter>>,
}

impl CliObserver<'_> {
    fn take_error(&mut self) -> Option<OutputError> {
        let text = self.text.take_error();
        let csv  = self.csv.as_mut().and_then(ReportObserver::take_error);
        text.or(csv)
    }
}

impl SimObserver for CliObserver<'_> {
    fn on_start(&mut self, info: &RunInfo) {
        self.text.on_start(info);
        if let Some(csv) = &mut self.csv {
            csv.on_start(info);
        }
    }

    fn on_report(&mut self, report: &StepReport) {
        self.text.on_report(report);
        if let Some(csv) = &mut self.csv {
            csv.on_report(report);
        }
    }

    fn on_snapshot(&mut self, tick: Tick, road: &Road) {
        self.text.on_snapshot(tick, road);
        if let Some(csv) = &mut self.csv {
            csv.on_snapshot(tick, road);
        }
    }

    fn on_sim_end(&mut self, summary: &RunSummary) {
        self.text.on_sim_end(summary);
        if let Some(csv) = &mut self.csv {
            csv.on_sim_end(summary);
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn run(args: &Args) -> Result<()> {
    let config = args.config();
    info!(
        workers = config.workers,
        seed = config.seed,
        mode = %config.mode,
        sequential = args.sequential,
        "starting"
    );

    let csv = match &args.csv {
        Some(dir) => {
            let writer = CsvWriter::new(dir)
                .with_context(|| format!("cannot create CSV output in {}", dir.display()))?;
            Some(ReportObserver::new(writer))
        }
        None => None,
    };
    let text = TextWriter::new(io::stdout().lock()).with_snapshots(args.snapshot_interval > 0);
    let mut observer = CliObserver { text: ReportObserver::new(text), csv };

    let mut builder = SimBuilder::new(config);
    if let Some(ms) = args.timeout_ms {
        builder = builder.timeout(Duration::from_millis(ms));
    }
    if args.buffered {
        builder = builder.delivery(Delivery::Buffered);
    }

    let summary = if args.sequential {
        builder.build_sequential()?.run(&mut observer)?
    } else {
        builder.build()?.run(&mut observer)?
    };

    if let Some(err) = observer.take_error() {
        bail!("failed to write output: {err}");
    }
    info!(
        final_cars = summary.final_road.car_count(),
        reports = summary.reports.len(),
        "done"
    );
    Ok(())
}

/// Filter used when `RUST_LOG` is unset: run progress from the simulator
/// and this binary, warnings from everything else.
fn default_filter() -> String {
    format!("warn,ca_sim=info,{}=info", module_path!())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter())),
        )
        .with_writer(io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version land here too.
        Err(e) if !e.use_stderr() => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
