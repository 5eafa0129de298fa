//! Deal financial parameters and the derived quantities every engine shares

use serde::{Deserialize, Serialize};

use crate::assumptions::FinancingTerms;
use crate::error::{AnalysisError, AnalysisResult};

/// Flat set of financial inputs for a single real-estate deal
///
/// Monetary fields are dollars. `hoa_fees` is monthly; taxes and insurance are annual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DealParameters {
    pub purchase_price: f64,

    /// After-repair value
    #[serde(alias = "arv")]
    pub after_repair_value: f64,

    #[serde(default)]
    pub repair_costs: f64,

    pub monthly_rent: f64,

    #[serde(default)]
    pub closing_costs: f64,

    #[serde(default)]
    pub annual_taxes: f64,

    #[serde(default)]
    pub annual_insurance: f64,

    /// Monthly HOA dues
    #[serde(default)]
    pub hoa_fees: f64,

    /// Vacancy as a percentage in [0, 100]
    #[serde(default = "default_vacancy_rate_pct")]
    pub vacancy_rate_pct: f64,
}

fn default_vacancy_rate_pct() -> f64 {
    5.0
}

impl DealParameters {
    /// Check documented input ranges, naming the first offending field
    pub fn validate(&self) -> AnalysisResult<()> {
        let monetary = [
            ("purchase_price", self.purchase_price),
            ("after_repair_value", self.after_repair_value),
            ("repair_costs", self.repair_costs),
            ("monthly_rent", self.monthly_rent),
            ("closing_costs", self.closing_costs),
            ("annual_taxes", self.annual_taxes),
            ("annual_insurance", self.annual_insurance),
            ("hoa_fees", self.hoa_fees),
        ];

        for (field, value) in monetary {
            if !value.is_finite() {
                return Err(AnalysisError::invalid(field, format!("must be finite, got {}", value)));
            }
            if value < 0.0 {
                return Err(AnalysisError::invalid(field, format!("must be non-negative, got {}", value)));
            }
        }

        if !(0.0..=100.0).contains(&self.vacancy_rate_pct) {
            return Err(AnalysisError::invalid(
                "vacancy_rate_pct",
                format!("must be within [0, 100], got {}", self.vacancy_rate_pct),
            ));
        }

        Ok(())
    }

    /// Gross scheduled rent for one year
    pub fn annual_rent(&self) -> f64 {
        self.monthly_rent * 12.0
    }

    /// Vacancy as a fraction
    pub fn vacancy_rate(&self) -> f64 {
        self.vacancy_rate_pct / 100.0
    }

    /// Taxes + insurance + HOA + maintenance/management proxy on gross rent
    pub fn annual_expenses(&self, terms: &FinancingTerms) -> f64 {
        self.annual_taxes
            + self.annual_insurance
            + self.hoa_fees * 12.0
            + terms.maintenance_rate * self.annual_rent()
    }

    pub fn loan_amount(&self, terms: &FinancingTerms) -> f64 {
        self.purchase_price * terms.loan_to_value
    }

    pub fn down_payment(&self, terms: &FinancingTerms) -> f64 {
        self.purchase_price - self.loan_amount(terms)
    }

    /// Down payment plus closing and repair costs
    pub fn total_cash_invested(&self, terms: &FinancingTerms) -> f64 {
        self.down_payment(terms) + self.closing_costs + self.repair_costs
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Reference deal used throughout the test suite
    pub(crate) fn sample_deal() -> DealParameters {
        DealParameters {
            purchase_price: 250_000.0,
            after_repair_value: 320_000.0,
            repair_costs: 25_000.0,
            monthly_rent: 2_500.0,
            closing_costs: 7_500.0,
            annual_taxes: 3_000.0,
            annual_insurance: 1_200.0,
            hoa_fees: 0.0,
            vacancy_rate_pct: 5.0,
        }
    }

    pub(crate) fn zero_price_deal() -> DealParameters {
        DealParameters {
            purchase_price: 0.0,
            ..sample_deal()
        }
    }

    #[test]
    fn test_derived_amounts() {
        let deal = sample_deal();
        let terms = FinancingTerms::default();

        assert_relative_eq!(deal.annual_rent(), 30_000.0);
        // 3000 + 1200 + 0 + 10% of 30000
        assert_relative_eq!(deal.annual_expenses(&terms), 7_200.0);
        assert_relative_eq!(deal.loan_amount(&terms), 200_000.0);
        assert_relative_eq!(deal.down_payment(&terms), 50_000.0);
        assert_relative_eq!(deal.total_cash_invested(&terms), 82_500.0);
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample_deal().validate().is_ok());
        assert!(zero_price_deal().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let deal = DealParameters {
            purchase_price: -1.0,
            ..sample_deal()
        };
        let err = deal.validate().unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("purchase_price"));
    }

    #[test]
    fn test_validate_rejects_vacancy_out_of_range() {
        let deal = DealParameters {
            vacancy_rate_pct: 120.0,
            ..sample_deal()
        };
        assert!(matches!(
            deal.validate(),
            Err(AnalysisError::InvalidInput { field: "vacancy_rate_pct", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let deal = DealParameters {
            monthly_rent: f64::NAN,
            ..sample_deal()
        };
        assert!(deal.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"purchase_price": 100000, "arv": 150000, "monthly_rent": 1200}"#;
        let deal: DealParameters = serde_json::from_str(json).unwrap();
        assert_relative_eq!(deal.after_repair_value, 150_000.0);
        assert_relative_eq!(deal.vacancy_rate_pct, 5.0);
        assert_relative_eq!(deal.repair_costs, 0.0);
    }
}
