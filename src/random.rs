//! Seeded random number generation.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random generator used by the optimizer and its operators.
pub type GaRng = StdRng;

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> GaRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator seeded from `seed`, or from OS entropy when `None`.
pub fn rng_from_seed(seed: Option<u64>) -> GaRng {
    match seed {
        Some(seed) => create_rng(seed),
        None => create_rng(rand::random()),
    }
}
