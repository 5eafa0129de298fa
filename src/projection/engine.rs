//! Core projection engine for annual deal cash-flow projections

use std::collections::BTreeMap;

use log::debug;

use crate::assumptions::{remaining_balance, Assumptions, ScenarioKind};
use crate::deal::DealParameters;
use crate::error::AnalysisResult;
use super::state::ProjectionState;
use super::cashflows::{ProjectionRow, ProjectionResult};

/// Main projection engine
pub struct ProjectionEngine {
    assumptions: Assumptions,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given assumptions
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Project every built-in scenario for a deal
    pub fn project_deal(&self, deal: &DealParameters) -> AnalysisResult<BTreeMap<ScenarioKind, ProjectionResult>> {
        deal.validate()?;

        Ok(ScenarioKind::ALL
            .into_iter()
            .map(|kind| (kind, self.project_validated(deal, kind)))
            .collect())
    }

    /// Project a single scenario
    pub fn project_scenario(&self, deal: &DealParameters, kind: ScenarioKind) -> AnalysisResult<ProjectionResult> {
        deal.validate()?;
        Ok(self.project_validated(deal, kind))
    }

    fn project_validated(&self, deal: &DealParameters, kind: ScenarioKind) -> ProjectionResult {
        let terms = &self.assumptions.financing;
        let scenario = *self.assumptions.scenarios.get(kind);

        let mut result = ProjectionResult::new(kind, scenario, deal.purchase_price, deal.down_payment(terms));
        let mut state = ProjectionState::from_deal(deal, terms);

        for _year in 1..=terms.projection_years {
            state.advance_year();

            let row = self.calculate_year(deal, kind, &mut state);
            result.add_row(row);

            // Levels for next year
            state.apply_growth(&scenario);
        }

        debug!(
            "{}: projected {} years, total cash flow {:.2}",
            kind,
            result.rows.len(),
            result.summary().total_cash_flow
        );

        result
    }

    /// Calculate one year's row from the current state
    fn calculate_year(&self, deal: &DealParameters, kind: ScenarioKind, state: &mut ProjectionState) -> ProjectionRow {
        let terms = &self.assumptions.financing;
        let scenario = self.assumptions.scenarios.get(kind);
        let mut row = ProjectionRow::new(state.year);

        // Operations
        row.gross_rent = state.current_rent;
        row.effective_rent = state.effective_rent(scenario.vacancy_rate);
        row.operating_expenses = state.current_expenses;
        row.net_operating_income = row.effective_rent - row.operating_expenses;

        // Flat P&I approximation on the original loan
        let loan = deal.loan_amount(terms);
        row.debt_service = loan * terms.debt_service_constant;
        row.cash_flow = row.net_operating_income - row.debt_service;

        // Value and amortized balance at year end
        row.property_value = deal.purchase_price * (1.0 + terms.appreciation_rate).powi(state.year as i32);
        row.loan_balance = remaining_balance(
            loan,
            terms.mortgage_rate,
            terms.amortization_years,
            state.year * 12,
        );
        row.equity = row.property_value - row.loan_balance;

        state.cumulative_cash_flow += row.cash_flow;
        row.cumulative_cash_flow = state.cumulative_cash_flow;
        row.cumulative_return = row.cumulative_cash_flow + row.equity - deal.down_payment(terms);

        row
    }
}

impl Default for ProjectionEngine {
    fn default() -> Self {
        Self::new(Assumptions::default_underwriting())
    }
}
