/// Identifier for a node in a [`crate::node_store::NodeStore`].
///
/// This is an index into the store's per-node arrays, and is only
/// meaningful for the population the store was built with.
pub type NodeId = usize;

/// Outcome of a single [`crate::sim::Simulation::tick`].
///
/// Hosts may ignore it; the phase machine handles transitions itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    Continuing,
    PhaseTransitioned,
}
