//! Scenario runner pairing each projection with its return metrics
//!
//! Holds one set of assumptions and reuses it across deals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::assumptions::{Assumptions, ScenarioKind};
use crate::deal::DealParameters;
use crate::error::AnalysisResult;
use crate::projection::{ProjectionEngine, ProjectionResult, ReturnMetrics};

/// Projection table and metrics for one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub projection: ProjectionResult,
    pub metrics: ReturnMetrics,
}

/// Runs all built-in scenarios for deals under shared assumptions
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let metrics = runner.metrics(&deal)?;
/// println!("Base case IRR: {:.2}%", metrics[&ScenarioKind::BaseCase].irr);
/// ```
pub struct ScenarioRunner {
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with default in-memory assumptions
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_underwriting())
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv_path(path: &std::path::Path) -> AnalysisResult<Self> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            engine: ProjectionEngine::new(assumptions),
        }
    }

    /// Project every scenario and compute its metrics
    pub fn run(&self, deal: &DealParameters) -> AnalysisResult<BTreeMap<ScenarioKind, ScenarioOutcome>> {
        let terms = &self.engine.assumptions().financing;

        Ok(self
            .engine
            .project_deal(deal)?
            .into_iter()
            .map(|(kind, projection)| {
                let metrics = ReturnMetrics::from_projection(&projection, terms);
                (kind, ScenarioOutcome { projection, metrics })
            })
            .collect())
    }

    /// Return metrics per scenario
    pub fn metrics(&self, deal: &DealParameters) -> AnalysisResult<BTreeMap<ScenarioKind, ReturnMetrics>> {
        Ok(self
            .run(deal)?
            .into_iter()
            .map(|(kind, outcome)| (kind, outcome.metrics))
            .collect())
    }

    /// Run all scenarios for multiple deals
    pub fn run_batch(
        &self,
        deals: &[DealParameters],
    ) -> AnalysisResult<Vec<BTreeMap<ScenarioKind, ScenarioOutcome>>> {
        deals.iter().map(|deal| self.run(deal)).collect()
    }

    /// Get reference to the assumptions in use
    pub fn assumptions(&self) -> &Assumptions {
        self.engine.assumptions()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::ScenarioAssumptions;
    use crate::deal::tests::{sample_deal, zero_price_deal};

    #[test]
    fn test_metrics_for_every_scenario() {
        let runner = ScenarioRunner::new();
        let metrics = runner.metrics(&sample_deal()).unwrap();

        assert_eq!(metrics.len(), 3);
        assert!(metrics[&ScenarioKind::Conservative].irr < metrics[&ScenarioKind::BaseCase].irr);
        assert!(metrics[&ScenarioKind::BaseCase].irr < metrics[&ScenarioKind::Optimistic].irr);
    }

    #[test]
    fn test_custom_assumptions_flow_through() {
        let mut assumptions = Assumptions::default_underwriting();
        assumptions.scenarios.set(
            ScenarioKind::BaseCase,
            ScenarioAssumptions {
                rent_growth: 0.0,
                expense_growth: 0.0,
                vacancy_rate: 0.0,
            },
        );
        let runner = ScenarioRunner::with_assumptions(assumptions);
        let outcomes = runner.run(&sample_deal()).unwrap();
        let base = &outcomes[&ScenarioKind::BaseCase].projection;

        // Flat rent and expenses: every year identical
        assert!(base.rows.iter().all(|r| r.net_operating_income == base.rows[0].net_operating_income));
        assert_eq!(base.rows[0].effective_rent, 30_000.0);
    }

    #[test]
    fn test_zero_price_roi_is_zero() {
        let runner = ScenarioRunner::new();
        for metrics in runner.metrics(&zero_price_deal()).unwrap().values() {
            assert_eq!(metrics.roi, 0.0);
            assert!(!metrics.roi.is_nan());
        }
    }

    #[test]
    fn test_batch() {
        let runner = ScenarioRunner::new();
        let results = runner.run_batch(&[sample_deal(), zero_price_deal()]).unwrap();
        assert_eq!(results.len(), 2);
    }
}
