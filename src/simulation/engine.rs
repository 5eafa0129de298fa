//! Monte Carlo driver: batches of seeded trials run in parallel

use log::{debug, info};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::rng::batch_rng;
use super::summary::{SimulationSummary, TrialAccumulator};
use super::trial::{SimulationTrial, TrialInputs};
use crate::assumptions::{Assumptions, TrialSamplers};
use crate::deal::DealParameters;
use crate::error::{AnalysisError, AnalysisResult};

pub const DEFAULT_TRIALS: usize = 1000;
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Run configuration for a simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub trials: usize,
    /// Master seed; drawn from entropy and reported back when absent
    pub seed: Option<u64>,
    pub batch_size: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SimulationConfig {
    pub fn seeded(trials: usize, seed: u64) -> Self {
        Self {
            trials,
            seed: Some(seed),
            ..Default::default()
        }
    }
}

/// Monte Carlo simulator over the configured input distributions
pub struct MonteCarloSimulator {
    assumptions: Assumptions,
}

impl MonteCarloSimulator {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Run `config.trials` trials split into independently seeded batches
    ///
    /// Output depends only on the deal, the assumptions, the trial count, the
    /// batch size and the seed; thread scheduling has no effect.
    pub fn simulate(&self, deal: &DealParameters, config: &SimulationConfig) -> AnalysisResult<SimulationSummary> {
        let samplers = self.prepare(deal, config.trials)?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let batch_size = config.batch_size.max(1);
        let num_batches = config.trials.div_ceil(batch_size);

        info!(
            "Simulating {} trials in {} batches (seed {})",
            config.trials, num_batches, seed
        );

        let batches: Vec<TrialAccumulator> = (0..num_batches)
            .into_par_iter()
            .map(|batch| {
                let start = batch * batch_size;
                let count = batch_size.min(config.trials - start);
                let mut rng = batch_rng(seed, batch as u64);
                self.run_trials(deal, &samplers, count, &mut rng)
            })
            .collect();

        // collect() keeps batch order, so the merge is deterministic
        let merged = batches.into_iter().fold(
            TrialAccumulator::with_capacity(config.trials),
            |mut acc, batch| {
                acc.merge(batch);
                acc
            },
        );

        let summary = merged.into_summary(Some(seed));
        debug!(
            "Simulation done: mean ROI {:.2}%, P(roi>0) {:.3}",
            summary.mean_roi, summary.probability_positive
        );
        Ok(summary)
    }

    /// Single-threaded run drawing every trial from a caller-supplied generator
    pub fn simulate_with_rng<R: Rng + ?Sized>(
        &self,
        deal: &DealParameters,
        trials: usize,
        rng: &mut R,
    ) -> AnalysisResult<SimulationSummary> {
        let samplers = self.prepare(deal, trials)?;
        Ok(self.run_trials(deal, &samplers, trials, rng).into_summary(None))
    }

    fn prepare(&self, deal: &DealParameters, trials: usize) -> AnalysisResult<TrialSamplers> {
        if trials < 1 {
            return Err(AnalysisError::InvalidTrialCount(trials));
        }
        deal.validate()?;
        self.assumptions.distributions.samplers()
    }

    fn run_trials<R: Rng + ?Sized>(
        &self,
        deal: &DealParameters,
        samplers: &TrialSamplers,
        count: usize,
        rng: &mut R,
    ) -> TrialAccumulator {
        let terms = &self.assumptions.financing;
        let mut acc = TrialAccumulator::with_capacity(count);
        for _ in 0..count {
            let inputs = TrialInputs::sample(samplers, rng);
            acc.push(&SimulationTrial::run(deal, terms, inputs));
        }
        acc
    }
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self::new(Assumptions::default_underwriting())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::tests::{sample_deal, zero_price_deal};
    use crate::simulation::rng::seeded_rng;

    #[test]
    fn test_same_seed_same_summary() {
        let sim = MonteCarloSimulator::default();
        let config = SimulationConfig::seeded(1000, 42);

        let a = sim.simulate(&sample_deal(), &config).unwrap();
        let b = sim.simulate(&sample_deal(), &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trials, 1000);
        assert_eq!(a.seed, Some(42));
    }

    #[test]
    fn test_different_seeds_differ() {
        let sim = MonteCarloSimulator::default();
        let a = sim.simulate(&sample_deal(), &SimulationConfig::seeded(500, 1)).unwrap();
        let b = sim.simulate(&sample_deal(), &SimulationConfig::seeded(500, 2)).unwrap();
        assert_ne!(a.mean_roi, b.mean_roi);
    }

    #[test]
    fn test_unseeded_run_reports_seed() {
        let sim = MonteCarloSimulator::default();
        let config = SimulationConfig {
            trials: 10,
            ..Default::default()
        };
        let summary = sim.simulate(&sample_deal(), &config).unwrap();
        let seed = summary.seed.unwrap();

        let replay = sim.simulate(&sample_deal(), &SimulationConfig::seeded(10, seed)).unwrap();
        assert_eq!(summary, replay);
    }

    #[test]
    fn test_mean_converges() {
        let sim = MonteCarloSimulator::default();
        let small = sim.simulate(&sample_deal(), &SimulationConfig::seeded(500, 7)).unwrap();
        let large = sim.simulate(&sample_deal(), &SimulationConfig::seeded(50_000, 11)).unwrap();

        let band = 4.0 * large.std_roi / (500f64).sqrt();
        assert!((small.mean_roi - large.mean_roi).abs() < band);
    }

    #[test]
    fn test_summary_is_ordered() {
        let sim = MonteCarloSimulator::default();
        let s = sim.simulate(&sample_deal(), &SimulationConfig::seeded(2000, 3)).unwrap();

        assert!(s.min_roi <= s.percentile_5);
        assert!(s.percentile_5 <= s.median_roi);
        assert!(s.median_roi <= s.percentile_95);
        assert!(s.percentile_95 <= s.max_roi);
        assert!((0.0..=1.0).contains(&s.probability_positive));
        assert!(s.probability_above_target <= s.probability_positive);
        assert!(s.std_roi > 0.0);
    }

    #[test]
    fn test_zero_trials_rejected() {
        let sim = MonteCarloSimulator::default();
        let result = sim.simulate(&sample_deal(), &SimulationConfig::seeded(0, 1));
        assert!(matches!(result, Err(AnalysisError::InvalidTrialCount(0))));
    }

    #[test]
    fn test_zero_price_has_no_nan() {
        let sim = MonteCarloSimulator::default();
        let s = sim.simulate(&zero_price_deal(), &SimulationConfig::seeded(100, 5)).unwrap();
        assert_eq!(s.mean_roi, 0.0);
        assert_eq!(s.probability_positive, 0.0);
        assert!(!s.std_roi.is_nan());
    }

    #[test]
    fn test_caller_supplied_rng() {
        let sim = MonteCarloSimulator::default();
        let a = sim.simulate_with_rng(&sample_deal(), 200, &mut seeded_rng(9)).unwrap();
        let b = sim.simulate_with_rng(&sample_deal(), 200, &mut seeded_rng(9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, None);
    }
}
