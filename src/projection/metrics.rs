//! Return metrics derived from a scenario projection

use log::warn;
use serde::{Deserialize, Serialize};

use crate::assumptions::FinancingTerms;
use super::cashflows::ProjectionResult;
use super::irr::{npv, solve_irr, IrrStatus};

/// Investment returns for one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// Internal rate of return, percent
    pub irr: f64,

    /// Solver outcome for `irr`; `None` when there is no initial outlay
    pub irr_status: Option<IrrStatus>,

    /// Net present value at the financing discount rate
    pub npv: f64,

    /// Operating cash flows plus net sale proceeds (initial outlay excluded)
    pub total_return: f64,

    /// `total_return` over down payment, percent
    pub roi: f64,

    /// Average annual cash flow over down payment, percent
    pub cash_on_cash: f64,

    /// Average NOI over average debt service
    pub debt_coverage_ratio: f64,

    /// Year-one NOI over purchase price, percent
    pub cap_rate: f64,

    /// Final value less loan balance and selling costs
    pub terminal_sale_proceeds: f64,
}

/// Investor cash-flow vector: outlay at t=0, sale proceeds folded into the final year
pub fn investor_cash_flows(result: &ProjectionResult, terms: &FinancingTerms) -> Vec<f64> {
    let mut flows = Vec::with_capacity(result.rows.len() + 1);
    flows.push(-result.down_payment);
    flows.extend(result.rows.iter().map(|r| r.cash_flow));

    if let Some(last) = flows.last_mut() {
        if !result.rows.is_empty() {
            *last += terminal_sale_proceeds(result, terms);
        }
    }

    flows
}

fn terminal_sale_proceeds(result: &ProjectionResult, terms: &FinancingTerms) -> f64 {
    result
        .final_row()
        .map(|r| r.property_value - r.loan_balance - terms.selling_cost_rate * r.property_value)
        .unwrap_or(0.0)
}

/// Divide, defining any ratio over a non-positive base as zero
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl ReturnMetrics {
    pub fn from_projection(result: &ProjectionResult, terms: &FinancingTerms) -> Self {
        let flows = investor_cash_flows(result, terms);
        let down_payment = result.down_payment;
        let years = result.rows.len().max(1) as f64;

        let (irr, irr_status) = if down_payment > 0.0 {
            let solution = solve_irr(&flows);
            if !solution.is_root() {
                warn!(
                    "{}: IRR solver returned {:?} after {} iterations, reporting {:.2}%",
                    result.scenario,
                    solution.status,
                    solution.iterations,
                    solution.rate * 100.0
                );
            }
            (solution.rate * 100.0, Some(solution.status))
        } else {
            (0.0, None)
        };

        let total_return: f64 = flows.iter().skip(1).sum();
        let mean_cash_flow = result.rows.iter().map(|r| r.cash_flow).sum::<f64>() / years;
        let mean_noi = result.rows.iter().map(|r| r.net_operating_income).sum::<f64>() / years;
        let mean_debt_service = result.rows.iter().map(|r| r.debt_service).sum::<f64>() / years;
        let first_noi = result.rows.first().map(|r| r.net_operating_income).unwrap_or(0.0);

        Self {
            irr,
            irr_status,
            npv: npv(&flows, terms.discount_rate),
            total_return,
            roi: ratio(total_return, down_payment) * 100.0,
            cash_on_cash: ratio(mean_cash_flow, down_payment) * 100.0,
            debt_coverage_ratio: ratio(mean_noi, mean_debt_service),
            cap_rate: ratio(first_noi, result.purchase_price) * 100.0,
            terminal_sale_proceeds: terminal_sale_proceeds(result, terms),
        }
    }
}
