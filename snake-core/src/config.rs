use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants of the chain simulation.
///
/// Distances and speeds are in screens, i.e. fractions of the unit square.
/// Missing fields take their [`Default`] value when deserialized.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for initial placement and explosion velocities.
    pub seed: u64,
    /// Number of nodes in the population.
    pub node_count: usize,
    /// Gap an attached node keeps to its target.
    pub follow_distance: f32,
    /// Distance at or below which a free node chomps its target.
    pub merge_threshold: f32,
    /// Speed of free nodes, in screens per second.
    pub cruise_speed: f32,
    /// Per-axis bound of the velocity handed out when exploding.
    pub max_explosion_velocity: f32,
    /// How long the explosion phase lasts in simulated time.
    pub explosion_duration: Duration,
    /// Largest frame delta a host should feed into a single tick.
    ///
    /// The attached-node follow step is not velocity based, so long
    /// ticks make chains overshoot.
    pub max_tick: Duration,
    /// Overrides the `ceil(sqrt(node_count))` grid resolution.
    pub grid_cells_per_axis: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 123_456_789,
            node_count: 500,
            follow_distance: 0.001,
            merge_threshold: 0.001,
            cruise_speed: 0.1,
            max_explosion_velocity: 0.5,
            explosion_duration: Duration::from_secs(5),
            max_tick: Duration::from_millis(50),
            grid_cells_per_axis: None,
        }
    }
}

impl Config {
    /// Checks that every value can drive a simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count == 0 {
            return Err(ConfigError::Invalid("node_count must be positive"));
        }
        if !(self.follow_distance.is_finite() && self.follow_distance >= 0.0) {
            return Err(ConfigError::Invalid(
                "follow_distance must be finite and non-negative",
            ));
        }
        if !(self.merge_threshold.is_finite() && self.merge_threshold > 0.0) {
            return Err(ConfigError::Invalid(
                "merge_threshold must be finite and positive",
            ));
        }
        if !(self.cruise_speed.is_finite() && self.cruise_speed > 0.0) {
            return Err(ConfigError::Invalid(
                "cruise_speed must be finite and positive",
            ));
        }
        if !(self.max_explosion_velocity.is_finite() && self.max_explosion_velocity >= 0.0) {
            return Err(ConfigError::Invalid(
                "max_explosion_velocity must be finite and non-negative",
            ));
        }
        if self.explosion_duration.is_zero() {
            return Err(ConfigError::Invalid("explosion_duration must be positive"));
        }
        if self.max_tick.is_zero() {
            return Err(ConfigError::Invalid("max_tick must be positive"));
        }
        if self.grid_cells_per_axis == Some(0) {
            return Err(ConfigError::Invalid(
                "grid_cells_per_axis must be positive when set",
            ));
        }
        Ok(())
    }

    /// Grid resolution used for a population of `node_count` nodes.
    pub fn grid_cells_for(&self, node_count: usize) -> usize {
        self.grid_cells_per_axis
            .unwrap_or_else(|| (node_count as f64).sqrt().ceil() as usize)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let cases: [(fn(&mut Config), &str); 5] = [
            (|c| c.node_count = 0, "node_count"),
            (|c| c.merge_threshold = 0.0, "merge_threshold"),
            (|c| c.cruise_speed = f32::NAN, "cruise_speed"),
            (|c| c.explosion_duration = Duration::ZERO, "explosion_duration"),
            (|c| c.grid_cells_per_axis = Some(0), "grid_cells_per_axis"),
        ];

        for (mutate, field) in cases {
            let mut cfg = Config::default();
            mutate(&mut cfg);
            match cfg.validate() {
                Err(ConfigError::Invalid(msg)) => assert!(msg.starts_with(field), "{msg}"),
                Ok(()) => panic!("{field} should have been rejected"),
            }
        }
    }

    #[test]
    fn grid_cells_scale_with_population() {
        let cfg = Config::default();
        assert_eq!(cfg.grid_cells_for(500), 23);
        assert_eq!(cfg.grid_cells_for(16), 4);
        assert_eq!(cfg.grid_cells_for(0), 1);

        let fixed = Config {
            grid_cells_per_axis: Some(7),
            ..Config::default()
        };
        assert_eq!(fixed.grid_cells_for(500), 7);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{ "node_count": 64, "cruise_speed": 0.25 }"#)
            .expect("config should parse");

        assert_eq!(cfg.node_count, 64);
        assert_eq!(cfg.cruise_speed, 0.25);
        assert_eq!(cfg.merge_threshold, Config::default().merge_threshold);
        assert_eq!(cfg.explosion_duration, Duration::from_secs(5));
    }
}
