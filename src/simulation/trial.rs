//! A single Monte Carlo trial: sampled inputs folded through the 10-year recurrence

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assumptions::{annual_mortgage_payment, FinancingTerms, TrialSamplers};
use crate::deal::DealParameters;
use crate::projection::ratio;

/// Randomized inputs for one trial, held constant across the projection years
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialInputs {
    pub rent_growth: f64,
    pub expense_growth: f64,
    pub vacancy_rate: f64,
    pub appreciation: f64,
    pub interest_rate: f64,
}

impl TrialInputs {
    pub(crate) fn sample<R: Rng + ?Sized>(samplers: &TrialSamplers, rng: &mut R) -> Self {
        Self {
            rent_growth: samplers.rent_growth.sample(rng),
            expense_growth: samplers.expense_growth.sample(rng),
            vacancy_rate: samplers.vacancy_rate.sample(rng),
            appreciation: samplers.appreciation.sample(rng),
            interest_rate: samplers.interest_rate.sample(rng),
        }
    }
}

/// Outcome of one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrial {
    pub inputs: TrialInputs,
    pub total_return: f64,
    /// Percent of down payment
    pub roi: f64,
    pub final_value: f64,
    pub total_cash_flow: f64,
}

impl SimulationTrial {
    /// Fold the annual cash-flow recurrence with this trial's inputs
    ///
    /// Debt service is the level payment at the sampled rate; the loan balance at
    /// the horizon uses the flat remaining-loan factor.
    pub fn run(deal: &DealParameters, terms: &FinancingTerms, inputs: TrialInputs) -> Self {
        let loan = deal.loan_amount(terms);
        let down_payment = deal.down_payment(terms);
        let debt_service = annual_mortgage_payment(loan, inputs.interest_rate, terms.amortization_years);

        let mut rent = deal.annual_rent();
        let mut expenses = deal.annual_expenses(terms);
        let mut total_cash_flow = 0.0;

        for _year in 0..terms.projection_years {
            let noi = rent * (1.0 - inputs.vacancy_rate) - expenses;
            total_cash_flow += noi - debt_service;

            rent *= 1.0 + inputs.rent_growth;
            expenses *= 1.0 + inputs.expense_growth;
        }

        let final_value = deal.purchase_price * (1.0 + inputs.appreciation).powi(terms.projection_years as i32);
        let remaining_loan = loan * terms.remaining_loan_factor;
        let total_return = total_cash_flow + (final_value - remaining_loan) - down_payment;

        Self {
            inputs,
            total_return,
            roi: ratio(total_return, down_payment) * 100.0,
            final_value,
            total_cash_flow,
        }
    }
}
