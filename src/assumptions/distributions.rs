//! Bounded normal distributions for the Monte Carlo inputs

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Normal distribution clipped to `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedNormal {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl BoundedNormal {
    pub const fn new(mean: f64, std_dev: f64, min: f64, max: f64) -> Self {
        Self { mean, std_dev, min, max }
    }

    /// Build a sampler, rejecting negative/non-finite spreads and inverted bounds
    pub fn sampler(&self, variable: &'static str) -> AnalysisResult<BoundedSampler> {
        let invalid = || AnalysisError::InvalidDistribution {
            variable,
            mean: self.mean,
            std_dev: self.std_dev,
        };

        if !(self.min <= self.max) || !self.mean.is_finite() {
            return Err(invalid());
        }

        let normal = Normal::new(self.mean, self.std_dev).map_err(|_| invalid())?;
        Ok(BoundedSampler {
            normal,
            min: self.min,
            max: self.max,
        })
    }
}

/// Ready-to-draw form of a [`BoundedNormal`]
#[derive(Debug, Clone, Copy)]
pub struct BoundedSampler {
    normal: Normal<f64>,
    min: f64,
    max: f64,
}

impl BoundedSampler {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.normal.sample(rng).clamp(self.min, self.max)
    }
}

/// Distributions for the five per-trial inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDistributions {
    pub rent_growth: BoundedNormal,
    pub expense_growth: BoundedNormal,
    pub vacancy_rate: BoundedNormal,
    pub appreciation: BoundedNormal,
    pub interest_rate: BoundedNormal,
}

impl Default for SimulationDistributions {
    fn default() -> Self {
        Self {
            rent_growth: BoundedNormal::new(0.03, 0.02, -0.05, 0.15),
            expense_growth: BoundedNormal::new(0.03, 0.015, 0.0, 0.10),
            vacancy_rate: BoundedNormal::new(0.05, 0.02, 0.0, 0.20),
            appreciation: BoundedNormal::new(0.03, 0.02, -0.10, 0.20),
            interest_rate: BoundedNormal::new(0.06, 0.01, 0.03, 0.12),
        }
    }
}

impl SimulationDistributions {
    /// Variable names in the order used by the CSV loader and the samplers
    pub const VARIABLES: [&'static str; 5] = [
        "rent_growth",
        "expense_growth",
        "vacancy_rate",
        "appreciation",
        "interest_rate",
    ];

    pub fn get_mut(&mut self, variable: &str) -> Option<&mut BoundedNormal> {
        match variable {
            "rent_growth" => Some(&mut self.rent_growth),
            "expense_growth" => Some(&mut self.expense_growth),
            "vacancy_rate" => Some(&mut self.vacancy_rate),
            "appreciation" => Some(&mut self.appreciation),
            "interest_rate" => Some(&mut self.interest_rate),
            _ => None,
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        self.samplers().map(|_| ())
    }

    pub(crate) fn samplers(&self) -> AnalysisResult<TrialSamplers> {
        Ok(TrialSamplers {
            rent_growth: self.rent_growth.sampler("rent_growth")?,
            expense_growth: self.expense_growth.sampler("expense_growth")?,
            vacancy_rate: self.vacancy_rate.sampler("vacancy_rate")?,
            appreciation: self.appreciation.sampler("appreciation")?,
            interest_rate: self.interest_rate.sampler("interest_rate")?,
        })
    }
}

/// Samplers for one trial's inputs, built once per simulation
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrialSamplers {
    pub rent_growth: BoundedSampler,
    pub expense_growth: BoundedSampler,
    pub vacancy_rate: BoundedSampler,
    pub appreciation: BoundedSampler,
    pub interest_rate: BoundedSampler,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn test_samples_stay_in_bounds() {
        let dist = BoundedNormal::new(0.0, 1.0, -0.5, 0.5);
        let sampler = dist.sampler("test").unwrap();
        let mut rng = Pcg64Mcg::seed_from_u64(7);

        for _ in 0..10_000 {
            let x = sampler.sample(&mut rng);
            assert!((-0.5..=0.5).contains(&x));
        }
    }

    #[test]
    fn test_negative_std_dev_rejected() {
        let dist = BoundedNormal::new(0.0, -1.0, -1.0, 1.0);
        assert!(matches!(
            dist.sampler("rent_growth"),
            Err(AnalysisError::InvalidDistribution { variable: "rent_growth", .. })
        ));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let dist = BoundedNormal::new(0.0, 0.1, 1.0, -1.0);
        assert!(dist.sampler("x").is_err());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(SimulationDistributions::default().validate().is_ok());
    }
}
