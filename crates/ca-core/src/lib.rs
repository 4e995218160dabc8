//! `ca-core`: foundational types for the `rust_ca` traffic automaton.
//!
//! This crate is a dependency of every other `ca-*` crate.  It intentionally
//! has no `ca-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `Rank`                                                |
//! | [`road`]        | `Cell`, `Road`                                        |
//! | [`time`]        | `Tick`                                                |
//! | [`rng`]         | `RoadRng` (Bernoulli road initializer)                |
//! | [`config`]      | `SimConfig`, `CommMode`                               |
//! | [`error`]       | `CaError`, `CaResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod road;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CommMode, SimConfig};
pub use error::{CaError, CaResult};
pub use ids::Rank;
pub use rng::RoadRng;
pub use road::{Cell, Road, count_cars};
pub use time::Tick;
