//! `ca-comm`: how workers talk to each other.
//!
//! Workers share no memory.  Everything they learn about the rest of the road
//! arrives as a message on a `crossbeam-channel` owned by their [`Endpoint`].
//!
//! # Layers
//!
//! ```text
//!   HaloExchange (AsyncExchange | ParityExchange)    halo.rs
//!        │  post / send / recv / wait_all
//!   Transport trait ── implemented by Endpoint       transport.rs
//!        │
//!   Fabric::ring → one Endpoint per rank             fabric.rs
//!        │  scatter / reduce_sum / gather
//!   coordinator collectives on Endpoint              collective.rs
//! ```
//!
//! # Delivery semantics
//!
//! | `Delivery`   | Channel capacity        | `send` returns when…            |
//! |--------------|-------------------------|---------------------------------|
//! | `Buffered`   | unbounded               | the value is queued             |
//! | `Rendezvous` | 0 (1 for a self-loop)   | a receiver has taken the value  |
//!
//! A failed or timed-out operation is never retried.  The worker returns the
//! error, its endpoint drops, and every peer blocked on it sees a
//! disconnection on its next operation, so one failure aborts the whole ring.

pub mod collective;
pub mod error;
pub mod fabric;
pub mod halo;
pub mod message;
pub mod transport;


pub use error::{CommError, CommResult, Op};
pub use fabric::{CommConfig, Delivery, Endpoint, Fabric};
pub use halo::{AsyncExchange, Boundary, ExchangeStats, Ghosts, HaloExchange, ParityExchange};
pub use message::{Tag, Uplink};
pub use transport::Transport;
