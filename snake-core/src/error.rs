//! Error types for the chain simulation.

use crate::types::NodeId;
use thiserror::Error;

/// Rejected [`crate::config::Config`] values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Signals raised while assembling chains.
///
/// `NoValidTarget` is expected: it is the trigger for the explosion phase
/// and never leaves [`crate::sim::Simulation::tick`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    #[error("node {node} has no valid target left")]
    NoValidTarget { node: NodeId },
}

/// Failures of the compact storage encodings in [`crate::packing`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PackError {
    #[error("target {target} does not fit in the 14-bit packed target field")]
    TargetOutOfRange { target: NodeId },
}
