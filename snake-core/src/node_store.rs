use crate::{
    error::PackError,
    packing::{PackedAttribs, QuantizedPos},
    types::NodeId,
};
use glam::Vec2;
use rand::Rng;

/// Per-node simulation state for the whole population.
///
/// Stored as parallel arrays indexed by [`NodeId`]; every phase of a tick
/// walks them linearly in ascending id order.
///
/// - `positions` - location in the unit square.
/// - `vectors` - during growth the vector to the target computed this
///   tick, during an explosion the node's velocity.
/// - `targets` - node being sought, `None` until first resolved.
/// - `tails` - chain id shared by every member of a chain.
/// - `has_parent` / `has_child` - permanent attachment flags.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStore {
    positions: Vec<Vec2>,
    vectors: Vec<Vec2>,
    targets: Vec<Option<NodeId>>,
    tails: Vec<NodeId>,
    has_parent: Vec<bool>,
    has_child: Vec<bool>,
}

impl NodeStore {
    /// Builds singleton nodes at the given positions.
    pub fn from_positions(positions: Vec<Vec2>) -> Self {
        let len = positions.len();
        Self {
            positions,
            vectors: vec![Vec2::ZERO; len],
            targets: vec![None; len],
            tails: (0..len).collect(),
            has_parent: vec![false; len],
            has_child: vec![false; len],
        }
    }

    /// Builds `count` singleton nodes scattered uniformly over the unit square.
    pub fn random(count: usize, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| Vec2::new(rng.random_range(0.0..=1.0), rng.random_range(0.0..=1.0)))
            .collect();
        Self::from_positions(positions)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Current positions in id order.
    #[inline]
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    #[inline]
    pub(crate) fn positions_mut(&mut self) -> &mut [Vec2] {
        &mut self.positions
    }

    #[inline]
    pub fn vectors(&self) -> &[Vec2] {
        &self.vectors
    }

    #[inline]
    pub(crate) fn vectors_mut(&mut self) -> &mut [Vec2] {
        &mut self.vectors
    }

    /// Mutable access to both arrays at once, for integrators.
    #[inline]
    pub(crate) fn motion_mut(&mut self) -> (&mut [Vec2], &mut [Vec2]) {
        (&mut self.positions, &mut self.vectors)
    }

    #[inline]
    pub fn target(&self, id: NodeId) -> Option<NodeId> {
        self.targets[id]
    }

    #[inline]
    pub fn tail(&self, id: NodeId) -> NodeId {
        self.tails[id]
    }

    #[inline]
    pub fn has_parent(&self, id: NodeId) -> bool {
        self.has_parent[id]
    }

    #[inline]
    pub fn has_child(&self, id: NodeId) -> bool {
        self.has_child[id]
    }

    /// Points `id` at `target`.
    ///
    /// ### Panics
    /// In debug builds, if `target` is out of range or `id` is already
    /// attached (an attached node's link is permanent).
    #[inline]
    pub fn set_target(&mut self, id: NodeId, target: NodeId) {
        debug_assert!(target < self.len(), "target {target} out of range");
        debug_assert!(!self.has_parent[id], "node {id} is attached");
        self.targets[id] = Some(target);
    }

    /// ### Panics
    /// In debug builds, if `tail` is not a valid node id.
    #[inline]
    pub fn set_tail(&mut self, id: NodeId, tail: NodeId) {
        debug_assert!(tail < self.len(), "tail {tail} out of range");
        self.tails[id] = tail;
    }

    #[inline]
    pub(crate) fn mark_parent(&mut self, id: NodeId) {
        self.has_parent[id] = true;
    }

    #[inline]
    pub(crate) fn mark_child(&mut self, id: NodeId) {
        self.has_child[id] = true;
    }

    /// Returns every node to its own singleton chain.
    ///
    /// Positions and targets are kept; a free node's target is recomputed
    /// on the next growth tick anyway.
    pub fn reset_chains(&mut self) {
        for (id, tail) in self.tails.iter_mut().enumerate() {
            *tail = id;
        }
        self.has_parent.fill(false);
        self.has_child.fill(false);
    }

    /// Number of distinct chains.
    ///
    /// Every chain has exactly one member nothing is attached to, so this
    /// counts childless nodes rather than distinct tails.
    pub fn chain_count(&self) -> usize {
        self.has_child.iter().filter(|&&c| !c).count()
    }

    /// Positions in the 16-bit fixed-point upload format.
    pub fn quantized_positions(&self) -> Vec<QuantizedPos> {
        self.positions.iter().map(|&p| QuantizedPos::from_vec2(p)).collect()
    }

    /// Link state in the 16-bit packed upload format.
    pub fn packed_attribs(&self) -> Result<Vec<PackedAttribs>, PackError> {
        (0..self.len())
            .map(|id| {
                PackedAttribs::pack(
                    self.has_parent[id],
                    self.has_child[id],
                    self.targets[id].unwrap_or(0),
                )
            })
            .collect()
    }
}
