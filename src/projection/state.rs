//! Projection state carried from one year to the next

use crate::assumptions::{FinancingTerms, ScenarioAssumptions};
use crate::deal::DealParameters;

/// Rent and expense levels at a point in the projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection year (1-indexed, 0 before the first advance)
    pub year: u32,

    /// Gross scheduled rent for the current year
    pub current_rent: f64,

    /// Operating expenses for the current year
    pub current_expenses: f64,

    /// Sum of cash flows through the current year
    pub cumulative_cash_flow: f64,
}

impl ProjectionState {
    /// Initialize state from a deal at acquisition
    pub fn from_deal(deal: &DealParameters, terms: &FinancingTerms) -> Self {
        Self {
            year: 0,
            current_rent: deal.annual_rent(),
            current_expenses: deal.annual_expenses(terms),
            cumulative_cash_flow: 0.0,
        }
    }

    /// Move to the next year without changing levels
    pub fn advance_year(&mut self) {
        self.year += 1;
    }

    /// Grow rent and expenses for the following year
    pub fn apply_growth(&mut self, assumptions: &ScenarioAssumptions) {
        self.current_rent *= 1.0 + assumptions.rent_growth;
        self.current_expenses *= 1.0 + assumptions.expense_growth;
    }

    /// Rent collected after vacancy
    pub fn effective_rent(&self, vacancy_rate: f64) -> f64 {
        self.current_rent * (1.0 - vacancy_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::tests::sample_deal;
    use approx::assert_relative_eq;

    #[test]
    fn test_growth_compounds() {
        let terms = FinancingTerms::default();
        let mut state = ProjectionState::from_deal(&sample_deal(), &terms);
        let growth = ScenarioAssumptions {
            rent_growth: 0.10,
            expense_growth: 0.0,
            vacancy_rate: 0.0,
        };

        state.apply_growth(&growth);
        state.apply_growth(&growth);

        assert_relative_eq!(state.current_rent, 30_000.0 * 1.21, epsilon = 1e-6);
        assert_relative_eq!(state.current_expenses, 7_200.0, epsilon = 1e-9);
    }
}
