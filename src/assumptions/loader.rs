//! CSV-based assumption loader
//!
//! Loads scenario and simulation assumptions from CSV files in data/assumptions/

use super::{ScenarioAssumptions, ScenarioKind, ScenarioTable, SimulationDistributions, BoundedNormal};
use crate::error::{AnalysisError, AnalysisResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// Load the scenario table from `scenarios.csv`
///
/// Columns: Scenario, RentGrowth, ExpenseGrowth, VacancyRate.
/// Scenarios missing from the file keep their built-in values.
pub fn load_scenarios(path: &Path) -> AnalysisResult<ScenarioTable> {
    let file = File::open(path.join("scenarios.csv"))?;
    scenarios_from_reader(file)
}

pub fn scenarios_from_reader<R: Read>(reader: R) -> AnalysisResult<ScenarioTable> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut table = ScenarioTable::default();

    for result in reader.records() {
        let record = result?;
        let kind: ScenarioKind = field(&record, 0)?.parse().map_err(AnalysisError::Parse)?;
        let assumptions = ScenarioAssumptions {
            rent_growth: parse_f64(&record, 1)?,
            expense_growth: parse_f64(&record, 2)?,
            vacancy_rate: parse_f64(&record, 3)?,
        };

        for (name, value) in [
            ("rent_growth", assumptions.rent_growth),
            ("expense_growth", assumptions.expense_growth),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::invalid(name, format!("for {} must be finite, got {}", kind, value)));
            }
        }

        if !(0.0..=1.0).contains(&assumptions.vacancy_rate) {
            return Err(AnalysisError::invalid(
                "vacancy_rate",
                format!("for {} must be a fraction in [0, 1]", kind),
            ));
        }

        table.set(kind, assumptions);
    }

    Ok(table)
}

/// Load simulation distributions from `distributions.csv`
///
/// Columns: Variable, Mean, StdDev, Min, Max
pub fn load_distributions(path: &Path) -> AnalysisResult<SimulationDistributions> {
    let file = File::open(path.join("distributions.csv"))?;
    distributions_from_reader(file)
}

pub fn distributions_from_reader<R: Read>(reader: R) -> AnalysisResult<SimulationDistributions> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut distributions = SimulationDistributions::default();

    for result in reader.records() {
        let record = result?;
        let variable = field(&record, 0)?;
        let parsed = BoundedNormal::new(
            parse_f64(&record, 1)?,
            parse_f64(&record, 2)?,
            parse_f64(&record, 3)?,
            parse_f64(&record, 4)?,
        );

        let slot = distributions
            .get_mut(variable)
            .ok_or_else(|| AnalysisError::Parse(format!("Unknown simulation variable: {}", variable)))?;
        *slot = parsed;
    }

    Ok(distributions)
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize) -> AnalysisResult<&'r str> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| AnalysisError::Parse(format!("Missing column {} in {:?}", idx, record)))
}

fn parse_f64(record: &csv::StringRecord, idx: usize) -> AnalysisResult<f64> {
    let raw = field(record, idx)?;
    raw.parse()
        .map_err(|_| AnalysisError::Parse(format!("Invalid number '{}' in column {}", raw, idx)))
}
