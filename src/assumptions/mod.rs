//! Underwriting assumptions: scenarios, financing terms, exit parameters and
//! simulation distributions

mod scenarios;
mod financing;
mod distributions;
pub mod loader;

pub use scenarios::{ScenarioKind, ScenarioAssumptions, ScenarioTable};
pub use financing::{FinancingTerms, ExitAssumptions, annual_mortgage_payment, remaining_balance};
pub use distributions::{BoundedNormal, BoundedSampler, SimulationDistributions};
pub(crate) use distributions::TrialSamplers;

use crate::error::AnalysisResult;
use std::path::Path;

/// Container for all analysis assumptions
#[derive(Debug, Clone)]
pub struct Assumptions {
    pub scenarios: ScenarioTable,
    pub financing: FinancingTerms,
    pub exit: ExitAssumptions,
    pub distributions: SimulationDistributions,
}

impl Assumptions {
    /// Built-in underwriting defaults
    pub fn default_underwriting() -> Self {
        Self {
            scenarios: ScenarioTable::default(),
            financing: FinancingTerms::default(),
            exit: ExitAssumptions::default(),
            distributions: SimulationDistributions::default(),
        }
    }

    /// Load assumptions from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> AnalysisResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load assumptions from CSV files in a specific directory
    ///
    /// Scenario and distribution tables come from disk; financing and exit
    /// terms keep their defaults.
    pub fn from_csv_path(path: &Path) -> AnalysisResult<Self> {
        let scenarios = loader::load_scenarios(path)?;
        let distributions = loader::load_distributions(path)?;
        distributions.validate()?;

        Ok(Self {
            scenarios,
            distributions,
            ..Self::default_underwriting()
        })
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_underwriting()
    }
}
