//! Run configuration.
//!
//! `SimConfig` is a plain struct: the binary fills it from the command line,
//! tests build it literally, and [`SimConfig::validate`] is the single gate
//! every run passes through before any worker starts.

use std::fmt;
use std::str::FromStr;

use crate::{CaError, CaResult, Tick};

// ── CommMode ──────────────────────────────────────────────────────────────────

/// Which halo-exchange strategy the workers use.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CommMode {
    /// Buffered sends and a single wait-all join per step.
    #[default]
    Async,
    /// Blocking rendezvous sends ordered by rank parity.
    Sync,
}

impl fmt::Display for CommMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommMode::Async => "async",
            CommMode::Sync  => "sync",
        };
        f.write_str(s)
    }
}

impl FromStr for CommMode {
    type Err = CaError;

    /// Accepts `async` / `sync` (any case) and the numeric forms `0` / `1`.
    fn from_str(s: &str) -> CaResult<CommMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "async" | "0" => Ok(CommMode::Async),
            "sync" | "1"  => Ok(CommMode::Sync),
            other => Err(CaError::Parse(format!("unknown communication mode {other:?}"))),
        }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Number of cells N on the circular road.  Default: 1000.
    pub road_length: usize,

    /// Number of timesteps T to simulate.  Default: 5000.
    pub timesteps: u64,

    /// Initial occupation probability D, in `(0, 1]`.  Default: 0.5.
    pub density: f64,

    /// Halo-exchange strategy.  Default: [`CommMode::Async`].
    pub mode: CommMode,

    /// Worker count P.  Must satisfy `1 <= P <= N`.
    pub workers: usize,

    /// Seed for the road initializer.  The same seed always produces the
    /// same initial road regardless of `workers`.
    pub seed: u64,

    /// Emit a progress report every N ticks (plus the final tick).
    /// Default: 1000.
    pub report_interval: u64,

    /// Gather the full road to the coordinator every N ticks.  0 disables
    /// snapshots; the road is then reassembled only at the end of the run.
    pub snapshot_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            road_length:       1_000,
            timesteps:         5_000,
            density:           0.5,
            mode:              CommMode::Async,
            workers:           1,
            seed:              0,
            report_interval:   1_000,
            snapshot_interval: 0,
        }
    }
}

impl SimConfig {
    /// Reject parameter combinations that cannot run.
    pub fn validate(&self) -> CaResult<()> {
        if self.road_length == 0 {
            return Err(CaError::Config("road length must be positive".into()));
        }
        if self.timesteps == 0 {
            return Err(CaError::Config("timestep count must be positive".into()));
        }
        // NaN fails both comparisons, so it is rejected here too.
        if !(self.density > 0.0 && self.density <= 1.0) {
            return Err(CaError::Config(format!(
                "density must be in (0, 1], got {}",
                self.density
            )));
        }
        if self.workers == 0 {
            return Err(CaError::Config("worker count must be positive".into()));
        }
        if self.workers > self.road_length {
            return Err(CaError::Config(format!(
                "{} workers cannot share a road of {} cells",
                self.workers, self.road_length
            )));
        }
        if self.report_interval == 0 {
            return Err(CaError::Config("report interval must be positive".into()));
        }
        Ok(())
    }

    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.timesteps)
    }

    /// The last tick that is simulated.
    #[inline]
    pub fn final_tick(&self) -> Tick {
        Tick(self.timesteps.saturating_sub(1))
    }

    /// Whether the global moved-car count is reduced and reported at `tick`.
    #[inline]
    pub fn is_report_tick(&self, tick: Tick) -> bool {
        tick.is_multiple_of(self.report_interval) || tick == self.final_tick()
    }

    /// Whether the road is gathered to the coordinator after `tick`.
    #[inline]
    pub fn is_snapshot_tick(&self, tick: Tick) -> bool {
        tick.is_multiple_of(self.snapshot_interval)
    }
}
