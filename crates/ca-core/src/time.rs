//! Simulation time model.
//!
//! Time is a monotonically increasing `Tick` counter, one tick per automaton
//! timestep.  Using an integer tick as the canonical time unit keeps report
//! cadence arithmetic exact.

use std::fmt;

/// An absolute simulation tick counter.
///
/// Stored as `u64`; a run of `T` timesteps visits ticks `0..T`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    /// `true` when `self` is a positive multiple of `interval` steps, or
    /// tick 0.  An `interval` of 0 never matches.
    #[inline]
    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval > 0 && self.0 % interval == 0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
