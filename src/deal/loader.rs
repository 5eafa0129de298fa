//! Load deals from CSV

use super::DealParameters;
use crate::error::AnalysisResult;
use csv::Reader;
use serde::Serialize;
use std::path::Path;

/// Raw CSV row matching the deal export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "DealID")]
    deal_id: String,
    #[serde(rename = "PurchasePrice")]
    purchase_price: f64,
    #[serde(rename = "AfterRepairValue")]
    after_repair_value: f64,
    #[serde(rename = "RepairCosts")]
    repair_costs: f64,
    #[serde(rename = "MonthlyRent")]
    monthly_rent: f64,
    #[serde(rename = "ClosingCosts")]
    closing_costs: f64,
    #[serde(rename = "AnnualTaxes")]
    annual_taxes: f64,
    #[serde(rename = "AnnualInsurance")]
    annual_insurance: f64,
    #[serde(rename = "HoaFees")]
    hoa_fees: f64,
    #[serde(rename = "VacancyRatePct")]
    vacancy_rate_pct: f64,
}

/// A deal with the identifier it was stored under
#[derive(Debug, Clone, Serialize)]
pub struct DealRecord {
    pub deal_id: String,
    pub params: DealParameters,
}

impl CsvRow {
    fn into_record(self) -> AnalysisResult<DealRecord> {
        let params = DealParameters {
            purchase_price: self.purchase_price,
            after_repair_value: self.after_repair_value,
            repair_costs: self.repair_costs,
            monthly_rent: self.monthly_rent,
            closing_costs: self.closing_costs,
            annual_taxes: self.annual_taxes,
            annual_insurance: self.annual_insurance,
            hoa_fees: self.hoa_fees,
            vacancy_rate_pct: self.vacancy_rate_pct,
        };
        params.validate()?;

        Ok(DealRecord {
            deal_id: self.deal_id,
            params,
        })
    }
}

/// Load all deals from a CSV file
pub fn load_deals<P: AsRef<Path>>(path: P) -> AnalysisResult<Vec<DealRecord>> {
    let reader = Reader::from_path(path)?;
    collect_records(reader)
}

/// Load deals from any reader (e.g., string buffer, stdin)
pub fn load_deals_from_reader<R: std::io::Read>(reader: R) -> AnalysisResult<Vec<DealRecord>> {
    collect_records(Reader::from_reader(reader))
}

fn collect_records<R: std::io::Read>(mut reader: Reader<R>) -> AnalysisResult<Vec<DealRecord>> {
    let mut deals = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        deals.push(row.into_record()?);
    }

    Ok(deals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    const HEADER: &str = "DealID,PurchasePrice,AfterRepairValue,RepairCosts,MonthlyRent,ClosingCosts,AnnualTaxes,AnnualInsurance,HoaFees,VacancyRatePct\n";

    #[test]
    fn test_load_deals_from_reader() {
        let data = format!(
            "{}maple-st,250000,320000,25000,2500,7500,3000,1200,0,5\noak-ave,180000,210000,10000,1650,5000,2400,900,35,6\n",
            HEADER
        );
        let deals = load_deals_from_reader(data.as_bytes()).unwrap();

        assert_eq!(deals.len(), 2);
        assert_eq!(deals[0].deal_id, "maple-st");
        assert_eq!(deals[0].params.purchase_price, 250_000.0);
        assert_eq!(deals[1].params.hoa_fees, 35.0);
    }

    #[test]
    fn test_invalid_row_is_rejected() {
        let data = format!("{}bad,-5,1,0,0,0,0,0,0,5\n", HEADER);
        let err = load_deals_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { field: "purchase_price", .. }));
    }

    #[test]
    fn test_malformed_row_is_csv_error() {
        let data = format!("{}bad,abc,1,0,0,0,0,0,0,5\n", HEADER);
        let err = load_deals_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, AnalysisError::Csv(_)));
    }
}
