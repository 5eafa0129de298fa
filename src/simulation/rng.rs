//! Deterministic random number generation for simulations.
//!
//! Nothing in a simulation draws from a platform RNG. Every batch of trials
//! gets its own stream, seeded from (master_seed, batch_index), so results do
//! not depend on how batches are scheduled across threads.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// Generator used for all simulation draws
pub type SimulationRng = Pcg64Mcg;

/// Mix a batch index into the master seed
pub fn derive_seed(master_seed: u64, batch_index: u64) -> u64 {
    master_seed ^ batch_index.wrapping_add(1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

/// Seeded generator for one batch
pub fn batch_rng(master_seed: u64, batch_index: u64) -> SimulationRng {
    Pcg64Mcg::seed_from_u64(derive_seed(master_seed, batch_index))
}

/// Seeded generator for a caller-supplied seed
pub fn seeded_rng(seed: u64) -> SimulationRng {
    Pcg64Mcg::seed_from_u64(seed)
}
