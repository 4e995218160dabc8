//! Deterministic RNG wrapper and the Bernoulli road initializer.
//!
//! Only the coordinator draws random numbers, once, before scatter.  Workers
//! never touch an RNG, so a run is fully determined by `(seed, N, D)` and the
//! worker count has no influence on the initial road.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{Cell, Road};

/// Coordinator-side RNG.  Used only in single-threaded contexts.
pub struct RoadRng(SmallRng);

impl RoadRng {
    pub fn new(seed: u64) -> Self {
        RoadRng(SmallRng::seed_from_u64(seed))
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Draw an i.i.d. Bernoulli(`density`) road of `len` cells.
    ///
    /// `density == 1.0` always yields a fully occupied road.
    pub fn road(&mut self, len: usize, density: f64) -> Road {
        let cells = (0..len).map(|_| Cell::from(self.gen_bool(density))).collect();
        Road::from_cells(cells)
    }
}
