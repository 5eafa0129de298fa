//! One-at-a-time sensitivity of a single-year cash-on-cash proxy

use std::collections::BTreeMap;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assumptions::{annual_mortgage_payment, Assumptions, FinancingTerms};
use crate::deal::DealParameters;
use crate::error::AnalysisResult;
use crate::projection::ratio;

/// Percent-of-value grid for monetary inputs
pub const PERCENT_GRID: [f64; 5] = [-20.0, -10.0, 0.0, 10.0, 20.0];
/// Percentage-point grid for rate inputs
pub const POINT_GRID: [f64; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    PurchasePrice,
    MonthlyRent,
    RepairCosts,
    VacancyRate,
    InterestRate,
}

impl SensitivityVariable {
    pub const ALL: [SensitivityVariable; 5] = [
        SensitivityVariable::PurchasePrice,
        SensitivityVariable::MonthlyRent,
        SensitivityVariable::RepairCosts,
        SensitivityVariable::VacancyRate,
        SensitivityVariable::InterestRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensitivityVariable::PurchasePrice => "purchase_price",
            SensitivityVariable::MonthlyRent => "monthly_rent",
            SensitivityVariable::RepairCosts => "repair_costs",
            SensitivityVariable::VacancyRate => "vacancy_rate",
            SensitivityVariable::InterestRate => "interest_rate",
        }
    }

    /// Rates move in percentage points, everything else in percent of value
    pub fn is_rate(&self) -> bool {
        matches!(self, SensitivityVariable::VacancyRate | SensitivityVariable::InterestRate)
    }

    pub fn grid(&self) -> &'static [f64; 5] {
        if self.is_rate() {
            &POINT_GRID
        } else {
            &PERCENT_GRID
        }
    }
}

impl fmt::Display for SensitivityVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub variable: SensitivityVariable,
    /// Percent of value, or percentage points for rates
    pub percent_change: f64,
    pub resulting_roi: f64,
    pub roi_impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_roi: f64,
    pub points: BTreeMap<SensitivityVariable, Vec<SensitivityPoint>>,
}

impl SensitivityReport {
    pub fn get(&self, variable: SensitivityVariable) -> Option<&[SensitivityPoint]> {
        self.points.get(&variable).map(Vec::as_slice)
    }

    /// Variables ordered by ROI swing (max - min) across their grid, widest first
    pub fn ranked_by_swing(&self) -> Vec<(SensitivityVariable, f64)> {
        let mut ranked: Vec<(SensitivityVariable, f64)> = self
            .points
            .iter()
            .map(|(variable, points)| {
                let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                    (lo.min(p.resulting_roi), hi.max(p.resulting_roi))
                });
                (*variable, if points.is_empty() { 0.0 } else { hi - lo })
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
    }
}

/// Deal inputs the proxy reads, with the interest rate made explicit
#[derive(Debug, Clone, Copy)]
struct ProxyInputs {
    deal: DealParameters,
    interest_rate: f64,
}

impl ProxyInputs {
    fn perturbed(&self, variable: SensitivityVariable, change: f64) -> Self {
        let mut inputs = *self;
        let scale = 1.0 + change / 100.0;
        match variable {
            SensitivityVariable::PurchasePrice => inputs.deal.purchase_price *= scale,
            SensitivityVariable::MonthlyRent => inputs.deal.monthly_rent *= scale,
            SensitivityVariable::RepairCosts => inputs.deal.repair_costs *= scale,
            SensitivityVariable::VacancyRate => {
                inputs.deal.vacancy_rate_pct = (inputs.deal.vacancy_rate_pct + change).clamp(0.0, 100.0)
            }
            SensitivityVariable::InterestRate => {
                inputs.interest_rate = (inputs.interest_rate + change / 100.0).max(0.0)
            }
        }
        inputs
    }
}

/// First-year cash-on-cash return in percent, 0 for a deal with no purchase price
pub fn proxy_roi(deal: &DealParameters, interest_rate: f64, terms: &FinancingTerms) -> f64 {
    if deal.purchase_price <= 0.0 {
        return 0.0;
    }
    let noi = deal.annual_rent() * (1.0 - deal.vacancy_rate()) - deal.annual_expenses(terms);
    let debt_service = annual_mortgage_payment(deal.loan_amount(terms), interest_rate, terms.amortization_years);
    ratio(noi - debt_service, deal.total_cash_invested(terms)) * 100.0
}

pub struct SensitivityAnalyzer {
    assumptions: Assumptions,
}

impl SensitivityAnalyzer {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    /// Sweep each variable across its grid with all others at baseline
    pub fn analyze(&self, deal: &DealParameters) -> AnalysisResult<SensitivityReport> {
        deal.validate()?;

        let terms = &self.assumptions.financing;
        let base = ProxyInputs {
            deal: *deal,
            interest_rate: terms.mortgage_rate,
        };
        let base_roi = proxy_roi(&base.deal, base.interest_rate, terms);

        let points: BTreeMap<_, _> = SensitivityVariable::ALL
            .iter()
            .map(|&variable| {
                let sweep: Vec<SensitivityPoint> = variable
                    .grid()
                    .iter()
                    .map(|&change| {
                        let inputs = base.perturbed(variable, change);
                        let resulting_roi = proxy_roi(&inputs.deal, inputs.interest_rate, terms);
                        SensitivityPoint {
                            variable,
                            percent_change: change,
                            resulting_roi,
                            roi_impact: resulting_roi - base_roi,
                        }
                    })
                    .collect();
                (variable, sweep)
            })
            .collect();

        debug!("Sensitivity base ROI {:.2}%", base_roi);
        Ok(SensitivityReport { base_roi, points })
    }
}

impl Default for SensitivityAnalyzer {
    fn default() -> Self {
        Self::new(Assumptions::default_underwriting())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::tests::{sample_deal, zero_price_deal};
    use approx::assert_relative_eq;

    #[test]
    fn test_base_roi_matches_hand_calculation() {
        let report = SensitivityAnalyzer::default().analyze(&sample_deal()).unwrap();
        let debt_service = annual_mortgage_payment(200_000.0, 0.06, 30);
        // (21300 - DS) / (50000 + 7500 + 25000)
        assert_relative_eq!(report.base_roi, (21_300.0 - debt_service) / 82_500.0 * 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_change_reproduces_base() {
        let report = SensitivityAnalyzer::default().analyze(&sample_deal()).unwrap();
        assert_eq!(report.points.len(), 5);

        for (variable, points) in &report.points {
            assert_eq!(points.len(), 5, "{variable}");
            let baseline = points.iter().find(|p| p.percent_change == 0.0).unwrap();
            assert_eq!(baseline.resulting_roi, report.base_roi);
            assert_eq!(baseline.roi_impact, 0.0);
        }
    }

    #[test]
    fn test_directions() {
        let report = SensitivityAnalyzer::default().analyze(&sample_deal()).unwrap();
        let rising = |v: SensitivityVariable| {
            let pts = report.get(v).unwrap();
            pts.windows(2).all(|w| w[1].resulting_roi > w[0].resulting_roi)
        };
        let falling = |v: SensitivityVariable| {
            let pts = report.get(v).unwrap();
            pts.windows(2).all(|w| w[1].resulting_roi < w[0].resulting_roi)
        };

        assert!(rising(SensitivityVariable::MonthlyRent));
        assert!(falling(SensitivityVariable::VacancyRate));
        assert!(falling(SensitivityVariable::InterestRate));
        assert!(falling(SensitivityVariable::RepairCosts));
    }

    #[test]
    fn test_rate_grid_is_points() {
        assert_eq!(SensitivityVariable::VacancyRate.grid(), &POINT_GRID);
        assert_eq!(SensitivityVariable::PurchasePrice.grid(), &PERCENT_GRID);

        let mut deal = sample_deal();
        deal.vacancy_rate_pct = 1.0;
        let report = SensitivityAnalyzer::default().analyze(&deal).unwrap();
        let vacancy = report.get(SensitivityVariable::VacancyRate).unwrap();
        // -2 and -1 both clamp to 0% vacancy
        assert_eq!(vacancy[0].resulting_roi, vacancy[1].resulting_roi);
    }

    #[test]
    fn test_swing_ranking() {
        let report = SensitivityAnalyzer::default().analyze(&sample_deal()).unwrap();
        let ranked = report.ranked_by_swing();
        assert_eq!(ranked.len(), 5);
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_zero_price_roi_is_zero() {
        // Closing and repair costs stay non-zero
        let report = SensitivityAnalyzer::default().analyze(&zero_price_deal()).unwrap();
        assert_eq!(report.base_roi, 0.0);
        for point in report.points.values().flatten() {
            assert_eq!(point.resulting_roi, 0.0, "{} {}", point.variable, point.percent_change);
            assert_eq!(point.roi_impact, 0.0);
        }
    }
}
