//! Cashflow output structures for projections

use serde::{Deserialize, Serialize};

use crate::assumptions::{ScenarioAssumptions, ScenarioKind};

/// A single row of projection output for one year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub year: u32,

    // Income
    pub gross_rent: f64,
    pub effective_rent: f64,
    pub operating_expenses: f64,
    pub net_operating_income: f64,

    // Financing
    pub debt_service: f64,
    pub cash_flow: f64,

    // Balance sheet
    pub property_value: f64,
    pub loan_balance: f64,
    pub equity: f64,

    // Running totals
    pub cumulative_cash_flow: f64,
    /// Cumulative cash flow plus equity gained over the down payment
    pub cumulative_return: f64,
}

impl ProjectionRow {
    /// Create a new row with zeroed amounts
    pub fn new(year: u32) -> Self {
        Self {
            year,
            gross_rent: 0.0,
            effective_rent: 0.0,
            operating_expenses: 0.0,
            net_operating_income: 0.0,
            debt_service: 0.0,
            cash_flow: 0.0,
            property_value: 0.0,
            loan_balance: 0.0,
            equity: 0.0,
            cumulative_cash_flow: 0.0,
            cumulative_return: 0.0,
        }
    }
}

/// Complete projection for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub scenario: ScenarioKind,

    /// Assumptions the rows were projected under
    pub assumptions: ScenarioAssumptions,

    pub purchase_price: f64,

    /// Cash invested at purchase
    pub down_payment: f64,

    /// Annual rows, year 1 first
    pub rows: Vec<ProjectionRow>,
}

impl ProjectionResult {
    pub fn new(
        scenario: ScenarioKind,
        assumptions: ScenarioAssumptions,
        purchase_price: f64,
        down_payment: f64,
    ) -> Self {
        Self {
            scenario,
            assumptions,
            purchase_price,
            down_payment,
            rows: Vec::new(),
        }
    }

    /// Add a projection row
    pub fn add_row(&mut self, row: ProjectionRow) {
        self.rows.push(row);
    }

    pub fn final_row(&self) -> Option<&ProjectionRow> {
        self.rows.last()
    }

    /// Annual levered cash flows, year 1 first
    pub fn cash_flows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.cash_flow).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_cash_flow: f64 = self.rows.iter().map(|r| r.cash_flow).sum();
        let total_noi: f64 = self.rows.iter().map(|r| r.net_operating_income).sum();
        let total_debt_service: f64 = self.rows.iter().map(|r| r.debt_service).sum();

        let final_value = self.final_row().map(|r| r.property_value).unwrap_or(0.0);
        let final_loan_balance = self.final_row().map(|r| r.loan_balance).unwrap_or(0.0);
        let final_equity = self.final_row().map(|r| r.equity).unwrap_or(0.0);

        ProjectionSummary {
            total_years: self.rows.len() as u32,
            total_cash_flow,
            total_noi,
            total_debt_service,
            final_value,
            final_loan_balance,
            final_equity,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_cash_flow: f64,
    pub total_noi: f64,
    pub total_debt_service: f64,
    pub final_value: f64,
    pub final_loan_balance: f64,
    pub final_equity: f64,
}
