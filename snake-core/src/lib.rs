//! Core chain-forming simulation library.
//!
//! A fixed population of points in the unit square greedily chases and
//! swallows its nearest neighbors until a single chain remains, then
//! explodes and starts over.
//!
//! Main components:
//! - [`node_store`] — per-node positions, targets and chain ids.
//! - [`spatial`] — uniform grid for nearest-target queries.
//! - [`chain`] — target selection, chomping and chain-id propagation.
//! - [`kinematics`] — position integration for both phases.
//! - [`phases`] — the per-tick pipelines.
//! - [`sim`] — the [`sim::Simulation`] context and its state machine.
//! - [`config`] — tunable constants.
//! - [`packing`] — compact encodings for upload or storage.
//! - [`timing`] — per-stage tick durations.
//! - [`error`] — error types.
//! - [`rng`] — seeded random number generation.
//! - [`types`] — shared type aliases and IDs.

pub mod chain;
pub mod config;
pub mod error;
pub mod kinematics;
pub mod node_store;
pub mod packing;
pub mod phases;
pub mod rng;
pub mod sim;
pub mod spatial;
pub mod timing;
pub mod types;

pub use config::Config;
pub use error::{ChainError, ConfigError, PackError};
pub use phases::Phase;
pub use sim::Simulation;
pub use types::{NodeId, TickStatus};
