use std::time::{Duration, Instant};

/// Wall-clock durations of the most recent tick, for profiling hosts.
///
/// Explosion ticks only record `update`; the growth stages keep the
/// values of the last growth tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Rebuilding the spatial grid.
    pub binning: Duration,
    /// Resolving nearest valid targets.
    pub nearest_neighbor: Duration,
    /// Target vectors plus position integration.
    pub position_update: Duration,
    /// The whole tick.
    pub update: Duration,
}

/// Runs `f` and stores how long it took in `slot`.
#[inline]
pub fn timed<T>(slot: &mut Duration, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    *slot = start.elapsed();
    out
}
