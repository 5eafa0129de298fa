//! Monte Carlo simulation of deal returns under uncertain growth, vacancy and rates

mod rng;
mod trial;
mod summary;
mod engine;

pub use rng::{batch_rng, derive_seed, seeded_rng, SimulationRng};
pub use trial::{SimulationTrial, TrialInputs};
pub use summary::{percentile, RunningStats, SimulationSummary, TrialAccumulator, TARGET_ROI_PCT};
pub use engine::{MonteCarloSimulator, SimulationConfig, DEFAULT_BATCH_SIZE, DEFAULT_TRIALS};
