//! Deterministic RNG utilities for reproducible tests.

use nalgebra::DVector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generate a deterministic ridge force vector of length `dim` from a seed.
///
/// Entries are uniform in `[-1, 1)`, so the vector also exercises pulling
/// (negative) ridge magnitudes that the solver itself never produces.
pub fn random_ridge_forces(dim: usize, seed: u64) -> DVector<f64> {
    let mut rng = seeded_rng(seed);
    DVector::from_fn(dim, |_, _| rng.gen_range(-1.0..1.0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
