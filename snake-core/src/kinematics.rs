//! Position integration for both simulation phases.

use crate::node_store::NodeStore;
use glam::Vec2;
use rand::Rng;

/// Recomputes every node's vector to its current target.
///
/// Nodes without a target get `Vec2::ZERO`.
pub fn update_target_vectors(store: &mut NodeStore) {
    for i in 0..store.len() {
        let v = match store.target(i) {
            Some(t) => store.positions()[t] - store.positions()[i],
            None => Vec2::ZERO,
        };
        store.vectors_mut()[i] = v;
    }
}

/// Moves every node for one growth tick, using the vectors from
/// [`update_target_vectors`].
///
/// - Free nodes cruise toward their target at `speed` screens per second.
/// - Attached nodes jump to exactly `follow_distance` short of their
///   target. This ignores `dt`, so large ticks overshoot.
///
/// A zero-length or non-finite vector moves the node by nothing.
pub fn integrate_growth(store: &mut NodeStore, speed: f32, follow_distance: f32, dt: f32) {
    for i in 0..store.len() {
        let v = store.vectors()[i];
        let offset = if store.has_parent(i) {
            follow_offset(v, follow_distance)
        } else {
            v.normalize_or_zero() * speed * dt
        };
        store.positions_mut()[i] += offset;
    }
}

#[inline]
fn follow_offset(v: Vec2, follow_distance: f32) -> Vec2 {
    let len = v.length();
    if len > 0.0 && len.is_finite() {
        v * (1.0 - follow_distance / len)
    } else {
        Vec2::ZERO
    }
}

/// Hands every node a random velocity, each axis drawn from
/// `[-max_velocity, max_velocity]`.
pub fn scatter_velocities(store: &mut NodeStore, rng: &mut impl Rng, max_velocity: f32) {
    for v in store.vectors_mut() {
        *v = Vec2::new(
            rng.random_range(-max_velocity..=max_velocity),
            rng.random_range(-max_velocity..=max_velocity),
        );
    }
}

/// Cubic Hermite blend from `a` to `b`; `t` is clamped to `[0, 1]`.
#[inline]
pub fn smooth_step(a: f32, b: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    a + t * t * (3.0 - 2.0 * t) * (b - a)
}

/// Moves every node for one explosion tick.
///
/// Velocity components pointing out of the unit square are reflected
/// once the node sits on or past the border. The stored velocity stays at
/// its initial magnitude; what gets integrated is that velocity eased
/// toward zero by `progress` (elapsed over total explosion time).
pub fn integrate_explosion(store: &mut NodeStore, progress: f32, dt: f32) {
    let (positions, velocities) = store.motion_mut();
    for (p, v) in positions.iter_mut().zip(velocities.iter_mut()) {
        v.x = reflect(p.x, v.x);
        v.y = reflect(p.y, v.y);

        let eased = Vec2::new(
            smooth_step(v.x, 0.0, progress),
            smooth_step(v.y, 0.0, progress),
        );
        *p += eased * dt;
    }
}

#[inline]
fn reflect(coord: f32, vel: f32) -> f32 {
    if (coord >= 1.0 && vel > 0.0) || (coord <= 0.0 && vel < 0.0) {
        -vel
    } else {
        vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;

    #[test]
    fn free_node_cruises_toward_target() {
        let mut store = NodeStore::from_positions(vec![Vec2::ZERO, Vec2::new(1.0, 0.0)]);
        store.set_target(0, 1);
        update_target_vectors(&mut store);

        integrate_growth(&mut store, 0.1, 0.001, 0.5);

        assert_eq!(store.positions()[0], Vec2::new(0.05, 0.0));
        // Node 1 has no target and stays put.
        assert_eq!(store.positions()[1], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn attached_node_keeps_follow_distance_regardless_of_dt() {
        for dt in [0.001, 0.016, 2.0] {
            let mut store = NodeStore::from_positions(vec![Vec2::ZERO, Vec2::new(0.3, 0.4)]);
            store.set_target(0, 1);
            update_target_vectors(&mut store);
            store.mark_parent(0);
            store.mark_child(1);

            integrate_growth(&mut store, 0.1, 0.01, dt);

            let gap = (store.positions()[1] - store.positions()[0]).length();
            assert!((gap - 0.01).abs() < 1e-6, "dt {dt}: gap {gap}");
        }
    }

    #[test]
    fn coincident_nodes_stay_finite() {
        let mut store = NodeStore::from_positions(vec![Vec2::splat(0.25); 2]);
        store.set_target(0, 1);
        store.set_target(1, 0);
        update_target_vectors(&mut store);

        assert_eq!(store.vectors()[0].normalize_or_zero(), Vec2::ZERO);
        integrate_growth(&mut store, 0.1, 0.001, 0.016);
        assert_eq!(store.positions()[0], Vec2::splat(0.25));

        // Same for an attached node sitting on its target.
        store.mark_parent(0);
        integrate_growth(&mut store, 0.1, 0.001, 0.016);
        assert!(store.positions().iter().all(|p| p.is_finite()));
    }

    #[test]
    fn non_finite_vectors_are_treated_as_zero() {
        assert_eq!(follow_offset(Vec2::new(f32::NAN, 0.0), 0.1), Vec2::ZERO);
        assert_eq!(follow_offset(Vec2::new(f32::INFINITY, 0.0), 0.1), Vec2::ZERO);
        assert_eq!(Vec2::new(f32::NAN, 1.0).normalize_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn smooth_step_eases_and_clamps() {
        assert_eq!(smooth_step(2.0, 0.0, 0.0), 2.0);
        assert_eq!(smooth_step(2.0, 0.0, 0.5), 1.0);
        assert_eq!(smooth_step(2.0, 0.0, 1.0), 0.0);
        assert_eq!(smooth_step(2.0, 0.0, 1.5), 0.0);
        assert_eq!(smooth_step(2.0, 0.0, -1.0), 2.0);
    }

    #[test]
    fn scatter_velocities_respects_bound() {
        let mut store = NodeStore::from_positions(vec![Vec2::splat(0.5); 64]);
        scatter_velocities(&mut store, &mut create_rng(3), 0.5);

        assert!(store.vectors().iter().all(|v| v.abs().max_element() <= 0.5));
        assert!(store.vectors().iter().any(|v| *v != Vec2::ZERO));
    }

    #[test]
    fn explosion_reflects_outgoing_velocity_at_border() {
        let mut store = NodeStore::from_positions(vec![Vec2::new(1.0, 0.5), Vec2::new(0.5, -0.1)]);
        store.vectors_mut()[0] = Vec2::new(0.3, 0.0);
        store.vectors_mut()[1] = Vec2::new(0.0, -0.2);

        integrate_explosion(&mut store, 0.0, 0.1);

        assert_eq!(store.vectors()[0], Vec2::new(-0.3, 0.0));
        assert_eq!(store.vectors()[1], Vec2::new(0.0, 0.2));
        assert!(store.positions()[0].x < 1.0);
        assert!(store.positions()[1].y > -0.1);
    }

    #[test]
    fn explosion_leaves_inward_velocity_alone() {
        let mut store = NodeStore::from_positions(vec![Vec2::new(1.2, 0.5)]);
        store.vectors_mut()[0] = Vec2::new(-0.3, 0.0);

        integrate_explosion(&mut store, 0.0, 0.1);

        assert_eq!(store.vectors()[0], Vec2::new(-0.3, 0.0));
    }

    #[test]
    fn explosion_motion_decays_to_rest() {
        let mut store = NodeStore::from_positions(vec![Vec2::splat(0.5)]);
        store.vectors_mut()[0] = Vec2::new(0.4, 0.0);

        integrate_explosion(&mut store, 1.0, 0.1);

        assert_eq!(store.positions()[0], Vec2::splat(0.5));
        // The stored velocity is not consumed by easing.
        assert_eq!(store.vectors()[0], Vec2::new(0.4, 0.0));
    }
}
