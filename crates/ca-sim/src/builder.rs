//! Fluent builder for constructing a [`Sim`] or a [`SequentialSim`].

use std::time::Duration;

use ca_comm::{CommConfig, Delivery};
use ca_core::{CommMode, Road, RoadRng, SimConfig};
use ca_partition::PartitionLayout;

use crate::{SequentialSim, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: road length, timesteps, density, mode, workers, seed, …
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default                                             |
/// |------------------|-----------------------------------------------------|
/// | `.road(r)`       | Bernoulli(`density`) road drawn from `seed`         |
/// | `.delivery(d)`   | `Buffered` for `async`, `Rendezvous` for `sync`     |
/// | `.timeout(d)`    | none: message operations may wait forever           |
///
/// # Example
///
/// ```rust,ignore
/// let sim = SimBuilder::new(config)
///     .road(road)
///     .timeout(Duration::from_secs(5))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:   SimConfig,
    road:     Option<Road>,
    delivery: Option<Delivery>,
    timeout:  Option<Duration>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            road:     None,
            delivery: None,
            timeout:  None,
        }
    }

    /// Supply the initial road instead of drawing one from the seed.
    ///
    /// Must have exactly `config.road_length` cells.
    pub fn road(mut self, road: Road) -> Self {
        self.road = Some(road);
        self
    }

    /// Override the fabric delivery.  The async strategy needs
    /// `Buffered`; the sync strategy works over either.
    pub fn delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// Fail any message operation that waits longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate the configuration and produce the initial road.
    fn prepare(&mut self) -> SimResult<Road> {
        self.config.validate()?;
        match self.road.take() {
            Some(road) if road.len() != self.config.road_length => Err(SimError::RoadLengthMismatch {
                expected: self.config.road_length,
                got:      road.len(),
            }),
            Some(road) => Ok(road),
            None => Ok(RoadRng::new(self.config.seed).road(self.config.road_length, self.config.density)),
        }
    }

    /// Validate inputs, build the partition layout, and return a
    /// ready-to-run [`Sim`].
    pub fn build(mut self) -> SimResult<Sim> {
        let road   = self.prepare()?;
        let layout = PartitionLayout::new(self.config.road_length, self.config.workers)?;

        let mut comm = CommConfig::for_mode(self.config.mode);
        if let Some(delivery) = self.delivery {
            comm.delivery = delivery;
        }
        if let Some(timeout) = self.timeout {
            comm = comm.with_timeout(timeout);
        }

        if self.config.mode == CommMode::Async && comm.delivery == Delivery::Rendezvous {
            return Err(SimError::Config(
                "the async strategy needs buffered delivery".into(),
            ));
        }

        Ok(Sim { config: self.config, layout, road, comm })
    }

    /// Validate inputs and return the single-threaded reference loop.
    /// `workers`, `mode`, `delivery` and `timeout` are ignored.
    pub fn build_sequential(mut self) -> SimResult<SequentialSim> {
        let road = self.prepare()?;
        Ok(SequentialSim::new(self.config, road))
    }
}
