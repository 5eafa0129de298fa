//! Closed-form comparison of Flip, Hold and BRRRR exits

use std::collections::BTreeMap;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, ExitAssumptions, FinancingTerms};
use crate::deal::DealParameters;
use crate::error::AnalysisResult;
use crate::projection::ratio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExitStrategy {
    Flip,
    Hold,
    #[serde(rename = "BRRRR")]
    Brrrr,
}

impl ExitStrategy {
    pub const ALL: [ExitStrategy; 3] = [ExitStrategy::Flip, ExitStrategy::Hold, ExitStrategy::Brrrr];

    pub fn name(&self) -> &'static str {
        match self {
            ExitStrategy::Flip => "Flip",
            ExitStrategy::Hold => "Hold",
            ExitStrategy::Brrrr => "BRRRR",
        }
    }
}

impl fmt::Display for ExitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitStrategyResult {
    pub strategy: ExitStrategy,
    pub profit: f64,
    /// Percent
    pub roi: f64,
    pub timeline_months: u32,
    pub annualized_roi: f64,
    pub risk_level: RiskLevel,
    pub capital_required: f64,
    /// Cash pulled out at refinance (BRRRR only)
    pub capital_recovered: Option<f64>,
    /// ROI is the cap value because no capital stayed in the deal
    pub roi_capped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitComparison {
    pub results: BTreeMap<ExitStrategy, ExitStrategyResult>,
}

impl ExitComparison {
    pub fn get(&self, strategy: ExitStrategy) -> Option<&ExitStrategyResult> {
        self.results.get(&strategy)
    }

    /// Strategy with the highest annualized ROI
    pub fn recommended(&self) -> Option<&ExitStrategyResult> {
        self.results
            .values()
            .max_by(|a, b| a.annualized_roi.total_cmp(&b.annualized_roi))
    }
}

pub struct ExitStrategyComparator {
    assumptions: Assumptions,
}

impl ExitStrategyComparator {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn compare(&self, deal: &DealParameters) -> AnalysisResult<ExitComparison> {
        deal.validate()?;

        let terms = &self.assumptions.financing;
        let exit = &self.assumptions.exit;
        let results: BTreeMap<_, _> = [
            flip(deal, exit),
            hold(deal, terms, exit),
            brrrr(deal, terms, exit),
        ]
        .into_iter()
        .map(|r| (r.strategy, r))
        .collect();

        Ok(ExitComparison { results })
    }
}

impl Default for ExitStrategyComparator {
    fn default() -> Self {
        Self::new(Assumptions::default_underwriting())
    }
}

/// ARV grown at the appreciation rate over the hold period
fn future_value(deal: &DealParameters, terms: &FinancingTerms, exit: &ExitAssumptions) -> f64 {
    deal.after_repair_value * (1.0 + terms.appreciation_rate).powi(exit.hold_years as i32)
}

/// Unvacated rent less expenses
fn annual_noi(deal: &DealParameters, terms: &FinancingTerms) -> f64 {
    deal.annual_rent() - deal.annual_expenses(terms)
}

fn flip(deal: &DealParameters, exit: &ExitAssumptions) -> ExitStrategyResult {
    let pp = deal.purchase_price;
    let profit = deal.after_repair_value - pp - deal.repair_costs - exit.flip_selling_cost_rate * pp;
    let roi = ratio(profit, pp) * 100.0;

    ExitStrategyResult {
        strategy: ExitStrategy::Flip,
        profit,
        roi,
        timeline_months: exit.flip_months,
        annualized_roi: ratio(roi * 12.0, exit.flip_months as f64),
        risk_level: RiskLevel::Medium,
        capital_required: pp + deal.repair_costs + deal.closing_costs,
        capital_recovered: None,
        roi_capped: false,
    }
}

fn hold(deal: &DealParameters, terms: &FinancingTerms, exit: &ExitAssumptions) -> ExitStrategyResult {
    let years = exit.hold_years as f64;
    let future = future_value(deal, terms, exit);

    let cash_flow = annual_noi(deal, terms) * years;
    let appreciation = future - deal.after_repair_value;
    let selling_costs = future * terms.selling_cost_rate;
    let profit = cash_flow + appreciation - selling_costs;
    let roi = ratio(profit, deal.purchase_price) * 100.0;

    ExitStrategyResult {
        strategy: ExitStrategy::Hold,
        profit,
        roi,
        timeline_months: exit.hold_years * 12,
        annualized_roi: ratio(roi, years),
        risk_level: RiskLevel::Low,
        capital_required: deal.down_payment(terms) + deal.closing_costs + deal.repair_costs,
        capital_recovered: None,
        roi_capped: false,
    }
}

fn brrrr(deal: &DealParameters, terms: &FinancingTerms, exit: &ExitAssumptions) -> ExitStrategyResult {
    let years = exit.hold_years as f64;
    let all_in = deal.purchase_price + deal.repair_costs;

    let refinance_value = deal.after_repair_value * exit.refinance_ltv;
    let capital_recovered = refinance_value - all_in;
    let annual_cash_flow = annual_noi(deal, terms) - refinance_value * exit.refinance_rate;
    let equity = future_value(deal, terms, exit) - refinance_value;
    let profit = annual_cash_flow * years + equity + capital_recovered;

    let effective_investment = (all_in - capital_recovered).max(0.0);
    let (roi, roi_capped) = if deal.purchase_price <= 0.0 {
        (0.0, false)
    } else if effective_investment > 0.0 {
        (profit / effective_investment * 100.0, false)
    } else {
        warn!(
            "BRRRR recovers all invested capital; ROI capped at {}%",
            exit.brrrr_roi_cap
        );
        (exit.brrrr_roi_cap, true)
    };

    ExitStrategyResult {
        strategy: ExitStrategy::Brrrr,
        profit,
        roi,
        timeline_months: exit.hold_years * 12,
        annualized_roi: ratio(roi, years),
        risk_level: RiskLevel::High,
        capital_required: all_in,
        capital_recovered: Some(capital_recovered),
        roi_capped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::tests::{sample_deal, zero_price_deal};
    use approx::assert_relative_eq;

    #[test]
    fn test_flip_reference_deal() {
        let cmp = ExitStrategyComparator::default().compare(&sample_deal()).unwrap();
        let flip = cmp.get(ExitStrategy::Flip).unwrap();

        // 320000 - 250000 - 25000 - 20000
        assert_relative_eq!(flip.profit, 25_000.0, epsilon = 1e-9);
        assert_relative_eq!(flip.roi, 10.0, epsilon = 1e-9);
        assert_relative_eq!(flip.annualized_roi, 20.0, epsilon = 1e-9);
        assert_eq!(flip.timeline_months, 6);
        assert_eq!(flip.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_hold_reference_deal() {
        let cmp = ExitStrategyComparator::default().compare(&sample_deal()).unwrap();
        let hold = cmp.get(ExitStrategy::Hold).unwrap();

        let future = 320_000.0 * 1.03f64.powi(5);
        let expected = 22_800.0 * 5.0 + (future - 320_000.0) - future * 0.06;
        assert_relative_eq!(hold.profit, expected, epsilon = 1e-6);
        assert_relative_eq!(hold.annualized_roi, hold.roi / 5.0, epsilon = 1e-12);
        assert_eq!(hold.timeline_months, 60);
        assert_relative_eq!(hold.capital_required, 82_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_brrrr_reference_deal() {
        let cmp = ExitStrategyComparator::default().compare(&sample_deal()).unwrap();
        let brrrr = cmp.get(ExitStrategy::Brrrr).unwrap();

        // 240000 refinance against 275000 all-in
        assert_relative_eq!(brrrr.capital_recovered.unwrap(), -35_000.0, epsilon = 1e-9);
        assert!(brrrr.capital_required.is_finite() && brrrr.capital_required >= 0.0);
        assert!(!brrrr.roi_capped);
        assert_eq!(brrrr.risk_level, RiskLevel::High);
        assert!(brrrr.roi.is_finite());
    }

    #[test]
    fn test_full_capital_recovery_caps_roi() {
        let deal = DealParameters {
            purchase_price: 100_000.0,
            after_repair_value: 400_000.0,
            repair_costs: 0.0,
            ..sample_deal()
        };
        let cmp = ExitStrategyComparator::default().compare(&deal).unwrap();
        let brrrr = cmp.get(ExitStrategy::Brrrr).unwrap();

        assert!(brrrr.roi_capped);
        assert_eq!(brrrr.roi, 999.0);
        assert_relative_eq!(brrrr.annualized_roi, 999.0 / 5.0);
    }

    #[test]
    fn test_zero_price_roi_is_zero() {
        let cmp = ExitStrategyComparator::default().compare(&zero_price_deal()).unwrap();
        for result in cmp.results.values() {
            assert_eq!(result.roi, 0.0, "{}", result.strategy);
            assert_eq!(result.annualized_roi, 0.0);
            assert!(!result.roi_capped);
        }
    }

    #[test]
    fn test_recommended_is_highest_annualized() {
        let cmp = ExitStrategyComparator::default().compare(&sample_deal()).unwrap();
        let best = cmp.recommended().unwrap();
        assert!(cmp.results.values().all(|r| r.annualized_roi <= best.annualized_roi));
        assert_eq!(cmp.results.len(), 3);
    }
}
