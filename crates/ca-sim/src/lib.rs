//! `ca-sim`: runs the traffic automaton across a ring of workers.
//!
//! # Per-worker step loop
//!
//! ```text
//! scatter segment, reduce initial car count        (INITIALIZED)
//! for tick in 0..config.timesteps:
//!   ① Exchange : swap boundary cells with both ring neighbours.
//!   ② Evaluate : apply the rule to the segment using the two ghosts.
//!   ③ Report   : on report ticks, reduce moved-car counts to rank 0.
//!   ④ Swap     : the next buffer becomes the current one.
//!                 (snapshot ticks also gather the road to rank 0)
//! gather final road                                (FINALIZE)
//! ```
//!
//! Rank 0 runs the same loop on the caller's thread and additionally plays
//! the [`Coordinator`] role: it owns the full road and the distribution
//! tables, turns reduced counts into [`StepReport`]s and feeds the
//! [`SimObserver`].
//!
//! [`SequentialSim`] advances the whole road on one thread with an
//! independent ring rule and serves as the oracle the distributed run is
//! checked against.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ca_core::SimConfig;
//! use ca_sim::{NoopObserver, SimBuilder};
//!
//! let config = SimConfig { workers: 4, seed: 42, ..SimConfig::default() };
//! let sim = SimBuilder::new(config).build()?;
//! let summary = sim.run(&mut NoopObserver)?;
//! ```

pub mod buffer;
pub mod builder;
pub mod coordinator;
pub mod error;
pub mod observer;
pub mod rule;
pub mod segment;
pub mod sequential;
pub mod sim;
pub mod stats;
pub mod worker;

#[cfg(test)]
mod tests;

pub use buffer::DoubleBuffer;
pub use builder::SimBuilder;
pub use coordinator::Coordinator;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use segment::LocalSegment;
pub use sequential::SequentialSim;
pub use sim::Sim;
pub use stats::{RunInfo, RunSummary, StepReport, velocity};
pub use worker::WorkerPhase;
