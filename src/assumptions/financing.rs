//! Financing and exit terms, plus the level-payment mortgage helpers
//!
//! Supports:
//! - Flat debt-service approximation used by the scenario projection
//! - Level-payment amortization (payment and remaining balance)

use serde::{Deserialize, Serialize};

/// Loan, valuation and discounting terms applied to every deal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingTerms {
    /// Loan amount as a fraction of purchase price
    pub loan_to_value: f64,

    /// Annual debt service as a fraction of the loan (flat P&I approximation)
    pub debt_service_constant: f64,

    /// Nominal annual mortgage rate used for balance amortization
    pub mortgage_rate: f64,

    pub amortization_years: u32,

    /// Annual property appreciation
    pub appreciation_rate: f64,

    /// Selling costs as a fraction of sale price
    pub selling_cost_rate: f64,

    /// Discount rate for NPV
    pub discount_rate: f64,

    /// Maintenance/management reserve as a fraction of gross rent
    pub maintenance_rate: f64,

    pub projection_years: u32,

    /// Remaining loan at the simulation horizon as a fraction of the original loan
    pub remaining_loan_factor: f64,
}

impl Default for FinancingTerms {
    fn default() -> Self {
        Self {
            loan_to_value: 0.80,
            debt_service_constant: 0.072,
            mortgage_rate: 0.06,
            amortization_years: 30,
            appreciation_rate: 0.03,
            selling_cost_rate: 0.06,
            discount_rate: 0.10,
            maintenance_rate: 0.10,
            projection_years: 10,
            remaining_loan_factor: 0.70,
        }
    }
}

/// Parameters for the closed-form exit strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitAssumptions {
    /// Selling costs on a flip, as a fraction of purchase price
    pub flip_selling_cost_rate: f64,
    pub flip_months: u32,
    pub hold_years: u32,
    /// Cash-out refinance loan-to-value on ARV
    pub refinance_ltv: f64,
    /// Annual cost of the refinance loan
    pub refinance_rate: f64,
    /// ROI reported (in percent) when BRRRR recovers all invested capital
    pub brrrr_roi_cap: f64,
}

impl Default for ExitAssumptions {
    fn default() -> Self {
        Self {
            flip_selling_cost_rate: 0.08,
            flip_months: 6,
            hold_years: 5,
            refinance_ltv: 0.75,
            refinance_rate: 0.06,
            brrrr_roi_cap: 999.0,
        }
    }
}

/// Annual total of level monthly payments on a fully amortizing loan
pub fn annual_mortgage_payment(loan: f64, annual_rate: f64, years: u32) -> f64 {
    let n = years * 12;
    if loan <= 0.0 || n == 0 {
        return 0.0;
    }

    let monthly_rate = annual_rate / 12.0;
    if monthly_rate.abs() < 1e-10 {
        return loan / n as f64 * 12.0;
    }

    let v = 1.0 / (1.0 + monthly_rate);
    let monthly_payment = loan * monthly_rate / (1.0 - v.powi(n as i32));
    monthly_payment * 12.0
}

/// Outstanding balance after `months_paid` level payments
pub fn remaining_balance(loan: f64, annual_rate: f64, years: u32, months_paid: u32) -> f64 {
    let n = years * 12;
    if loan <= 0.0 || n == 0 {
        return 0.0;
    }
    let p = months_paid.min(n);

    let monthly_rate = annual_rate / 12.0;
    if monthly_rate.abs() < 1e-10 {
        return loan * (1.0 - p as f64 / n as f64);
    }

    let growth_n = (1.0 + monthly_rate).powi(n as i32);
    let growth_p = (1.0 + monthly_rate).powi(p as i32);
    loan * (growth_n - growth_p) / (growth_n - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mortgage_payment() {
        // $200k at 6% over 30 years: $1,199.10/month
        let annual = annual_mortgage_payment(200_000.0, 0.06, 30);
        assert_relative_eq!(annual / 12.0, 1199.10, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_payment() {
        let annual = annual_mortgage_payment(360_000.0, 0.0, 30);
        assert_relative_eq!(annual, 12_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        assert_relative_eq!(remaining_balance(200_000.0, 0.06, 30, 0), 200_000.0, epsilon = 1e-6);
        assert_relative_eq!(remaining_balance(200_000.0, 0.06, 30, 360), 0.0, epsilon = 1e-6);
        assert_relative_eq!(remaining_balance(200_000.0, 0.06, 30, 500), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_remaining_balance_after_ten_years() {
        // Standard amortization table value for $200k, 6%, 30y after 120 payments
        let balance = remaining_balance(200_000.0, 0.06, 30, 120);
        assert_relative_eq!(balance, 167_371.0, epsilon = 5.0);
    }

    #[test]
    fn test_zero_loan() {
        assert_eq!(annual_mortgage_payment(0.0, 0.06, 30), 0.0);
        assert_eq!(remaining_balance(0.0, 0.06, 30, 12), 0.0);
    }
}
