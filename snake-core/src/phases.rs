//! Per-tick pipelines for the two simulation phases.
//!
//! A growth tick runs, in order:
//! 1. Binning: the [`UniformGrid`] is rebuilt from current positions.
//! 2. Targeting: every free node is pointed at its nearest valid target
//!    ([`chain::resolve_targets`]). The first node without one aborts the
//!    tick with [`ChainError::NoValidTarget`].
//! 3. Motion: target vectors are recomputed and positions integrated
//!    ([`kinematics::integrate_growth`]).
//! 4. Chomping: free nodes close enough to their target attach to it
//!    ([`chain::chomp_all`]).
//!
//! An explosion tick only runs [`kinematics::integrate_explosion`].
//! Switching between the two is up to [`crate::sim::Simulation`].

use crate::{
    chain,
    config::Config,
    error::ChainError,
    kinematics,
    node_store::NodeStore,
    spatial::UniformGrid,
    timing::{PhaseTimings, timed},
};
use rand::Rng;
use std::time::Duration;

/// Which update path the simulation runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Nodes seek targets and merge into chains.
    #[default]
    Growth,
    /// Nodes fly apart on decaying random velocities.
    Explosion {
        /// Simulated time spent exploding so far.
        elapsed: Duration,
    },
}

/// Runs one growth tick.
///
/// ### Parameters
/// - `store` - Node state, mutated in place.
/// - `grid` - Spatial index; rebuilt here before any query.
/// - `cfg` - Speeds and distances.
/// - `dt` - Simulated time covered by the tick.
/// - `timings` - Receives the duration of each stage.
///
/// ### Returns
/// - `Ok(chomps)` with the number of attachments made this tick.
/// - `Err(ChainError::NoValidTarget)` when targeting fails. Nothing has
///   moved yet in that case.
pub fn growth_phase(
    store: &mut NodeStore,
    grid: &mut UniformGrid,
    cfg: &Config,
    dt: Duration,
    timings: &mut PhaseTimings,
) -> Result<usize, ChainError> {
    timed(&mut timings.binning, || grid.rebuild(store.positions()));

    timed(&mut timings.nearest_neighbor, || {
        chain::resolve_targets(store, grid)
    })?;

    timed(&mut timings.position_update, || {
        kinematics::update_target_vectors(store);
        kinematics::integrate_growth(
            store,
            cfg.cruise_speed,
            cfg.follow_distance,
            dt.as_secs_f32(),
        );
    });

    Ok(chain::chomp_all(store, cfg.merge_threshold))
}

/// Starts an explosion: every node gets a fresh random velocity.
///
/// Chain links and flags are left as they are until the explosion ends.
pub fn enter_explosion(store: &mut NodeStore, rng: &mut impl Rng, cfg: &Config) {
    kinematics::scatter_velocities(store, rng, cfg.max_explosion_velocity);
}

/// Runs one explosion tick.
///
/// ### Parameters
/// - `elapsed` - Explosion time including this tick.
/// - `dt` - Simulated time covered by the tick.
///
/// ### Returns
/// `true` once `elapsed` has reached `cfg.explosion_duration`.
pub fn explosion_phase(
    store: &mut NodeStore,
    cfg: &Config,
    elapsed: Duration,
    dt: Duration,
) -> bool {
    let progress = elapsed.as_secs_f32() / cfg.explosion_duration.as_secs_f32();
    kinematics::integrate_explosion(store, progress, dt.as_secs_f32());
    elapsed >= cfg.explosion_duration
}

/// Ends an explosion: every node becomes its own chain again, wherever
/// it came to rest.
pub fn finish_explosion(store: &mut NodeStore) {
    store.reset_chains();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use glam::Vec2;

    fn scenario_config() -> Config {
        Config {
            merge_threshold: 0.01,
            cruise_speed: 0.1,
            ..Config::default()
        }
    }

    #[test]
    fn growth_phase_resolves_moves_and_chomps() {
        let mut store = NodeStore::from_positions(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.001, 0.0),
            Vec2::new(0.5, 0.5),
            Vec2::new(1.0, 1.0),
        ]);
        let mut grid = UniformGrid::with_cells(2);
        let mut timings = PhaseTimings::default();

        let chomps = growth_phase(
            &mut store,
            &mut grid,
            &scenario_config(),
            Duration::from_millis(16),
            &mut timings,
        );

        assert_eq!(chomps, Ok(1));
        assert_eq!(store.target(0), Some(1));
        assert!(store.has_parent(0));
        assert!(store.has_child(1));
        assert_eq!(store.tail(0), 0);
        assert_eq!(store.tail(1), 0);
        assert!(!store.has_parent(2) && !store.has_parent(3));
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn failed_targeting_leaves_positions_untouched() {
        let mut store = NodeStore::from_positions(vec![Vec2::new(0.2, 0.2)]);
        let before = store.clone();
        let mut grid = UniformGrid::with_cells(1);

        let out = growth_phase(
            &mut store,
            &mut grid,
            &Config::default(),
            Duration::from_millis(16),
            &mut PhaseTimings::default(),
        );

        assert_eq!(out, Err(ChainError::NoValidTarget { node: 0 }));
        assert_eq!(store, before);
    }

    #[test]
    fn explosion_keeps_chains_until_finished() {
        let mut store = NodeStore::from_positions(vec![Vec2::splat(0.5); 2]);
        store.set_target(0, 1);
        store.mark_parent(0);
        store.mark_child(1);
        store.set_tail(1, 0);

        let cfg = Config::default();
        enter_explosion(&mut store, &mut create_rng(1), &cfg);
        assert!(store.has_parent(0));

        let done = explosion_phase(&mut store, &cfg, Duration::from_secs(1), Duration::from_secs(1));
        assert!(!done);
        assert!(store.has_child(1));

        let done = explosion_phase(&mut store, &cfg, Duration::from_secs(5), Duration::from_secs(4));
        assert!(done);

        finish_explosion(&mut store);
        assert!(!store.has_parent(0) && !store.has_child(1));
        assert_eq!(store.tail(1), 1);
    }
}
