//! Deal Projection CLI
//!
//! Command-line interface for projecting and stress-testing a single deal

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;

use deal_projection::scenario::ScenarioOutcome;
use deal_projection::{
    Assumptions, DealParameters, ExitComparison, ExitStrategyComparator, MonteCarloSimulator, ScenarioKind,
    ScenarioRunner, SensitivityAnalyzer, SensitivityReport, SimulationConfig, SimulationSummary,
};

/// Return projections and risk analysis for a real-estate deal
#[derive(Parser)]
#[command(name = "deal_projection")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding scenarios.csv and distributions.csv
    #[arg(long, global = true)]
    assumptions: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ten-year projection for every scenario
    Project {
        #[command(flatten)]
        deal: DealArgs,

        /// Also write all projection rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// IRR, NPV and ratio metrics per scenario
    Metrics {
        #[command(flatten)]
        deal: DealArgs,
    },

    /// Monte Carlo ROI distribution
    Simulate {
        #[command(flatten)]
        deal: DealArgs,

        #[command(flatten)]
        sim: SimArgs,
    },

    /// One-at-a-time sensitivity of first-year ROI
    Sensitivity {
        #[command(flatten)]
        deal: DealArgs,
    },

    /// Compare Flip, Hold and BRRRR exits
    Exit {
        #[command(flatten)]
        deal: DealArgs,
    },

    /// Every analysis for one deal
    Report {
        #[command(flatten)]
        deal: DealArgs,

        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args)]
struct DealArgs {
    /// JSON file with the deal; individual flags are ignored when given
    #[arg(long)]
    deal: Option<PathBuf>,

    #[arg(long)]
    purchase_price: Option<f64>,

    /// After-repair value
    #[arg(long)]
    arv: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    repair_costs: f64,

    #[arg(long)]
    monthly_rent: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    closing_costs: f64,

    #[arg(long, default_value_t = 0.0)]
    annual_taxes: f64,

    #[arg(long, default_value_t = 0.0)]
    annual_insurance: f64,

    /// Monthly HOA dues
    #[arg(long, default_value_t = 0.0)]
    hoa_fees: f64,

    /// Vacancy, percent
    #[arg(long, default_value_t = 5.0)]
    vacancy: f64,
}

impl DealArgs {
    fn load(&self) -> Result<DealParameters> {
        if let Some(path) = &self.deal {
            let text = fs::read_to_string(path).with_context(|| format!("reading deal file {}", path.display()))?;
            let deal: DealParameters =
                serde_json::from_str(&text).with_context(|| format!("parsing deal file {}", path.display()))?;
            return Ok(deal);
        }

        let required = |value: Option<f64>, flag: &str| {
            value.with_context(|| format!("--{flag} is required when --deal is not given"))
        };

        Ok(DealParameters {
            purchase_price: required(self.purchase_price, "purchase-price")?,
            after_repair_value: required(self.arv, "arv")?,
            repair_costs: self.repair_costs,
            monthly_rent: required(self.monthly_rent, "monthly-rent")?,
            closing_costs: self.closing_costs,
            annual_taxes: self.annual_taxes,
            annual_insurance: self.annual_insurance,
            hoa_fees: self.hoa_fees,
            vacancy_rate_pct: self.vacancy,
        })
    }
}

#[derive(Args)]
struct SimArgs {
    #[arg(long, default_value_t = 1000)]
    trials: usize,

    /// Master seed; a random one is chosen and reported when omitted
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 250)]
    batch_size: usize,
}

impl SimArgs {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            trials: self.trials,
            seed: self.seed,
            batch_size: self.batch_size,
        }
    }
}

#[derive(Serialize)]
struct DealReport {
    deal: DealParameters,
    scenarios: BTreeMap<ScenarioKind, ScenarioOutcome>,
    simulation: SimulationSummary,
    sensitivity: SensitivityReport,
    exit: ExitComparison,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let assumptions = load_assumptions(cli.assumptions.as_deref())?;

    match &cli.command {
        Command::Project { deal, csv } => {
            let deal = deal.load()?;
            let outcomes = ScenarioRunner::with_assumptions(assumptions).run(&deal)?;
            if let Some(path) = csv {
                write_projection_csv(path, &outcomes)?;
                info!("Projection rows written to {}", path.display());
            }
            if cli.json {
                print_json(&outcomes)?;
            } else {
                print_projections(&outcomes);
            }
        }
        Command::Metrics { deal } => {
            let deal = deal.load()?;
            let outcomes = ScenarioRunner::with_assumptions(assumptions).run(&deal)?;
            if cli.json {
                let metrics: BTreeMap<_, _> = outcomes.iter().map(|(k, o)| (*k, &o.metrics)).collect();
                print_json(&metrics)?;
            } else {
                print_metrics(&outcomes);
            }
        }
        Command::Simulate { deal, sim } => {
            let deal = deal.load()?;
            let summary = MonteCarloSimulator::new(assumptions).simulate(&deal, &sim.config())?;
            if cli.json {
                print_json(&summary)?;
            } else {
                print_simulation(&summary);
            }
        }
        Command::Sensitivity { deal } => {
            let deal = deal.load()?;
            let report = SensitivityAnalyzer::new(assumptions).analyze(&deal)?;
            if cli.json {
                print_json(&report)?;
            } else {
                print_sensitivity(&report);
            }
        }
        Command::Exit { deal } => {
            let deal = deal.load()?;
            let comparison = ExitStrategyComparator::new(assumptions).compare(&deal)?;
            if cli.json {
                print_json(&comparison)?;
            } else {
                print_exits(&comparison);
            }
        }
        Command::Report { deal, sim } => {
            let deal = deal.load()?;
            let report = DealReport {
                deal,
                scenarios: ScenarioRunner::with_assumptions(assumptions.clone()).run(&deal)?,
                simulation: MonteCarloSimulator::new(assumptions.clone()).simulate(&deal, &sim.config())?,
                sensitivity: SensitivityAnalyzer::new(assumptions.clone()).analyze(&deal)?,
                exit: ExitStrategyComparator::new(assumptions).compare(&deal)?,
            };
            if cli.json {
                print_json(&report)?;
            } else {
                print_metrics(&report.scenarios);
                println!();
                print_simulation(&report.simulation);
                println!();
                print_sensitivity(&report.sensitivity);
                println!();
                print_exits(&report.exit);
            }
        }
    }

    Ok(())
}

fn load_assumptions(dir: Option<&Path>) -> Result<Assumptions> {
    match dir {
        Some(dir) => {
            info!("Loading assumptions from {}", dir.display());
            Assumptions::from_csv_path(dir).with_context(|| format!("loading assumptions from {}", dir.display()))
        }
        None => Ok(Assumptions::default_underwriting()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_projection_csv(path: &Path, outcomes: &BTreeMap<ScenarioKind, ScenarioOutcome>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;

    writer.write_record([
        "Scenario",
        "Year",
        "GrossRent",
        "EffectiveRent",
        "OperatingExpenses",
        "NOI",
        "DebtService",
        "CashFlow",
        "PropertyValue",
        "LoanBalance",
        "Equity",
        "CumulativeCashFlow",
        "CumulativeReturn",
    ])?;

    for (kind, outcome) in outcomes {
        for row in &outcome.projection.rows {
            writer.write_record(&[
                kind.name().to_string(),
                row.year.to_string(),
                format!("{:.2}", row.gross_rent),
                format!("{:.2}", row.effective_rent),
                format!("{:.2}", row.operating_expenses),
                format!("{:.2}", row.net_operating_income),
                format!("{:.2}", row.debt_service),
                format!("{:.2}", row.cash_flow),
                format!("{:.2}", row.property_value),
                format!("{:.2}", row.loan_balance),
                format!("{:.2}", row.equity),
                format!("{:.2}", row.cumulative_cash_flow),
                format!("{:.2}", row.cumulative_return),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

fn print_projections(outcomes: &BTreeMap<ScenarioKind, ScenarioOutcome>) {
    for (kind, outcome) in outcomes {
        let a = &outcome.projection.assumptions;
        println!(
            "{} (rent growth {:.1}%, expense growth {:.1}%, vacancy {:.1}%)",
            kind,
            a.rent_growth * 100.0,
            a.expense_growth * 100.0,
            a.vacancy_rate * 100.0
        );
        println!("{:>4} {:>12} {:>12} {:>12} {:>12} {:>14} {:>14} {:>14}",
            "Year", "EffRent", "NOI", "DebtSvc", "CashFlow", "Value", "Equity", "CumReturn");
        println!("{}", "-".repeat(102));

        for row in &outcome.projection.rows {
            println!("{:>4} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2} {:>14.2}",
                row.year,
                row.effective_rent,
                row.net_operating_income,
                row.debt_service,
                row.cash_flow,
                row.property_value,
                row.equity,
                row.cumulative_return,
            );
        }
        println!();
    }
}

fn print_metrics(outcomes: &BTreeMap<ScenarioKind, ScenarioOutcome>) {
    println!("{:<14} {:>9} {:>14} {:>14} {:>9} {:>9} {:>7} {:>8}",
        "Scenario", "IRR%", "NPV", "TotalReturn", "ROI%", "CoC%", "DSCR", "Cap%");
    println!("{}", "-".repeat(92));

    for (kind, outcome) in outcomes {
        let m = &outcome.metrics;
        println!("{:<14} {:>9.2} {:>14.2} {:>14.2} {:>9.2} {:>9.2} {:>7.2} {:>8.2}",
            kind.name(), m.irr, m.npv, m.total_return, m.roi, m.cash_on_cash, m.debt_coverage_ratio, m.cap_rate);
    }
}

fn print_simulation(s: &SimulationSummary) {
    println!("Monte Carlo ({} trials, seed {})", s.trials, s.seed.map_or("-".to_string(), |v| v.to_string()));
    println!("  Mean ROI:        {:>9.2}%", s.mean_roi);
    println!("  Median ROI:      {:>9.2}%", s.median_roi);
    println!("  Std Dev:         {:>9.2}%", s.std_roi);
    println!("  5th pct:         {:>9.2}%", s.percentile_5);
    println!("  95th pct:        {:>9.2}%", s.percentile_95);
    println!("  P(ROI > 0):      {:>9.1}%", s.probability_positive * 100.0);
    println!("  P(ROI > 15%):    {:>9.1}%", s.probability_above_target * 100.0);
    println!("  Mean final value: ${:.2}", s.mean_final_value);
}

fn print_sensitivity(report: &SensitivityReport) {
    println!("Sensitivity (base first-year ROI {:.2}%)", report.base_roi);
    for (variable, swing) in report.ranked_by_swing() {
        println!("  {:<16} swing {:>7.2} pts", variable.name(), swing);
        for p in report.get(variable).unwrap_or_default() {
            println!("    {:>+6.1} -> {:>8.2}% ({:>+7.2})", p.percent_change, p.resulting_roi, p.roi_impact);
        }
    }
}

fn print_exits(comparison: &ExitComparison) {
    println!("{:<7} {:>12} {:>9} {:>7} {:>11} {:>7} {:>12} {:>12}",
        "Exit", "Profit", "ROI%", "Months", "Annual%", "Risk", "Capital", "Recovered");
    println!("{}", "-".repeat(84));

    for r in comparison.results.values() {
        let recovered = r.capital_recovered.map_or("-".to_string(), |v| format!("{v:.2}"));
        let cap_marker = if r.roi_capped { "*" } else { "" };
        println!("{:<7} {:>12.2} {:>8.2}{:1} {:>7} {:>11.2} {:>7} {:>12.2} {:>12}",
            r.strategy.name(), r.profit, r.roi, cap_marker, r.timeline_months,
            r.annualized_roi, r.risk_level.to_string(), r.capital_required, recovered);
    }

    if let Some(best) = comparison.recommended() {
        println!("\nHighest annualized return: {}", best.strategy);
    }
}
