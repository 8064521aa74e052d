use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Create the deterministic RNG that drives placement and explosions.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}
