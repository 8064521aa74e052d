//! The simulation context: owns all node state and drives the
//! growth/explosion state machine.

use crate::{
    config::Config,
    error::{ChainError, ConfigError},
    node_store::NodeStore,
    packing::QuantizedPos,
    phases::{self, Phase},
    rng::create_rng,
    spatial::UniformGrid,
    timing::PhaseTimings,
    types::TickStatus,
};
use glam::Vec2;
use rand_chacha::ChaCha12Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A running chain simulation.
///
/// `tick` takes `&mut self` and `snapshot` takes `&self`, so a host can
/// never observe a half-finished tick.
#[derive(Debug)]
pub struct Simulation {
    cfg: Config,
    store: NodeStore,
    grid: UniformGrid,
    rng: ChaCha12Rng,
    phase: Phase,
    timings: PhaseTimings,
    tick_count: u64,
}

impl Simulation {
    /// Creates `cfg.node_count` nodes at positions drawn from `cfg.seed`.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut rng = create_rng(cfg.seed);
        let store = NodeStore::random(cfg.node_count, &mut rng);
        Ok(Self::assemble(cfg, store, rng))
    }

    /// Creates a simulation over caller-chosen starting positions.
    ///
    /// `cfg.node_count` is replaced by `positions.len()`; `cfg.seed` still
    /// drives explosion velocities.
    pub fn from_positions(mut cfg: Config, positions: Vec<Vec2>) -> Result<Self, ConfigError> {
        cfg.node_count = positions.len();
        cfg.validate()?;
        let rng = create_rng(cfg.seed);
        let store = NodeStore::from_positions(positions);
        Ok(Self::assemble(cfg, store, rng))
    }

    fn assemble(cfg: Config, store: NodeStore, rng: ChaCha12Rng) -> Self {
        let grid = UniformGrid::with_cells(cfg.grid_cells_for(store.len()));
        Self {
            cfg,
            store,
            grid,
            rng,
            phase: Phase::Growth,
            timings: PhaseTimings::default(),
            tick_count: 0,
        }
    }

    /// Replaces the population with `node_count` fresh singleton nodes
    /// placed from `seed`, and returns to the growth phase.
    pub fn reset(&mut self, seed: u64, node_count: usize) -> Result<(), ConfigError> {
        let cfg = Config {
            seed,
            node_count,
            ..self.cfg.clone()
        };
        *self = Self::new(cfg)?;
        info!(seed, node_count, "simulation reset");
        Ok(())
    }

    /// Advances the simulation by `dt` of simulated time.
    pub fn tick(&mut self, dt: Duration) -> TickStatus {
        let start = Instant::now();
        self.tick_count += 1;

        let status = match self.phase {
            Phase::Growth => self.tick_growth(dt),
            Phase::Explosion { elapsed } => self.tick_explosion(elapsed + dt, dt),
        };

        self.timings.update = start.elapsed();
        status
    }

    fn tick_growth(&mut self, dt: Duration) -> TickStatus {
        match phases::growth_phase(
            &mut self.store,
            &mut self.grid,
            &self.cfg,
            dt,
            &mut self.timings,
        ) {
            Ok(chomps) => {
                if chomps > 0 {
                    debug!(tick = self.tick_count, chomps, "chains merged");
                }
                TickStatus::Continuing
            }
            Err(ChainError::NoValidTarget { node }) => {
                info!(
                    tick = self.tick_count,
                    node,
                    chains = self.store.chain_count(),
                    "no valid targets left, exploding"
                );
                phases::enter_explosion(&mut self.store, &mut self.rng, &self.cfg);
                self.phase = Phase::Explosion {
                    elapsed: Duration::ZERO,
                };
                TickStatus::PhaseTransitioned
            }
        }
    }

    fn tick_explosion(&mut self, elapsed: Duration, dt: Duration) -> TickStatus {
        if phases::explosion_phase(&mut self.store, &self.cfg, elapsed, dt) {
            phases::finish_explosion(&mut self.store);
            self.phase = Phase::Growth;
            info!(tick = self.tick_count, "explosion over, regrowing");
            TickStatus::PhaseTransitioned
        } else {
            self.phase = Phase::Explosion { elapsed };
            TickStatus::Continuing
        }
    }

    /// Node positions after the last completed tick, in id order.
    #[inline]
    pub fn snapshot(&self) -> &[Vec2] {
        self.store.positions()
    }

    /// Positions in the 16-bit fixed-point upload format.
    pub fn quantized_snapshot(&self) -> Vec<QuantizedPos> {
        self.store.quantized_positions()
    }

    #[inline]
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn timings(&self) -> &PhaseTimings {
        &self.timings
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
