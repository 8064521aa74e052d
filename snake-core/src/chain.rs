//! Target selection and chain merging.
//!
//! Chains are identified by a shared tail id. Merges relabel eagerly: when
//! a node chomps its target, the target and everything ahead of it take
//! the chomper's tail id right away, so membership checks are a single
//! comparison. The cost of a merge is the length of the absorbed chain.

use crate::{error::ChainError, node_store::NodeStore, spatial::UniformGrid, types::NodeId};
use tracing::trace;

/// Whether `current` may seek `target`.
///
/// The target must not already have a child, and must belong to a
/// different chain (joining your own chain would close a cycle).
#[inline]
pub fn is_valid_target(store: &NodeStore, target: NodeId, current: NodeId) -> bool {
    !store.has_child(target) && store.tail(target) != store.tail(current)
}

/// Points free node `i` at its nearest valid target.
///
/// Attached nodes keep their permanent target and are skipped.
///
/// ### Returns
/// - `Ok(Some(target))` when a target was (re)assigned.
/// - `Ok(None)` when `i` is attached.
/// - `Err(ChainError::NoValidTarget)` when no node anywhere qualifies.
pub fn resolve_target(
    store: &mut NodeStore,
    grid: &UniformGrid,
    i: NodeId,
) -> Result<Option<NodeId>, ChainError> {
    if store.has_parent(i) {
        return Ok(None);
    }

    let found = grid.nearest(i, store.positions(), |j| is_valid_target(store, j, i));
    match found {
        Some((target, _)) => {
            store.set_target(i, target);
            Ok(Some(target))
        }
        None => Err(ChainError::NoValidTarget { node: i }),
    }
}

/// Resolves targets for every free node in ascending id order.
///
/// Stops at the first node without a valid target and returns its error;
/// later nodes keep last tick's targets.
///
/// ### Returns
/// The number of free nodes that were resolved.
pub fn resolve_targets(store: &mut NodeStore, grid: &UniformGrid) -> Result<usize, ChainError> {
    let mut resolved = 0;
    for i in 0..store.len() {
        if resolve_target(store, grid, i)?.is_some() {
            resolved += 1;
        }
    }
    Ok(resolved)
}

/// Attaches free node `i` to its target if it is close enough.
///
/// The distance is the length of the target vector computed earlier this
/// tick. Eligibility is checked again here because a lower id may already
/// have claimed the same target during this pass.
///
/// ### Returns
/// `true` if the chomp was committed.
pub fn try_chomp(store: &mut NodeStore, i: NodeId, threshold: f32) -> bool {
    if store.has_parent(i) {
        return false;
    }
    let Some(target) = store.target(i) else {
        return false;
    };
    if store.vectors()[i].length() > threshold || !is_valid_target(store, target, i) {
        return false;
    }

    store.mark_parent(i);
    store.mark_child(target);
    let tail = store.tail(i);
    propagate_tail(store, target, tail);

    trace!(node = i, target, tail, "chomp");
    true
}

/// Runs [`try_chomp`] over every free node in ascending id order.
///
/// ### Returns
/// The number of committed chomps.
pub fn chomp_all(store: &mut NodeStore, threshold: f32) -> usize {
    (0..store.len())
        .filter(|&i| try_chomp(store, i, threshold))
        .count()
}

/// Relabels `from` and every node ahead of it with `tail`.
///
/// Walks `target` links for as long as the visited node is attached.
fn propagate_tail(store: &mut NodeStore, from: NodeId, tail: NodeId) {
    store.set_tail(from, tail);

    let mut index = from;
    let mut steps = 0;
    while store.has_parent(index)
        && let Some(next) = store.target(index)
    {
        store.set_tail(next, tail);
        index = next;

        steps += 1;
        debug_assert!(steps <= store.len(), "cycle in chain through node {from}");
    }
}
