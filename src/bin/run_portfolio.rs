//! Run every analysis for a CSV of deals and write one summary row per deal
//!
//! Deals are evaluated in parallel. Each deal's simulation is seeded from the
//! master seed and the deal's position in the file, so reruns are reproducible.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use deal_projection::deal::load_deals;
use deal_projection::simulation::derive_seed;
use deal_projection::{
    AnalysisResult, Assumptions, DealRecord, ExitStrategy, ExitStrategyComparator, MonteCarloSimulator,
    ScenarioKind, ScenarioRunner, SimulationConfig,
};

#[derive(Parser)]
#[command(name = "run_portfolio", about = "Batch deal analysis")]
struct Cli {
    /// Deals CSV
    #[arg(long, default_value = "data/deals/sample_deals.csv")]
    deals: PathBuf,

    /// Summary CSV to write
    #[arg(short, long, default_value = "portfolio_summary.csv")]
    output: PathBuf,

    /// Directory holding scenarios.csv and distributions.csv
    #[arg(long)]
    assumptions: Option<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    trials: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Serialize)]
struct SummaryRow {
    #[serde(rename = "DealID")]
    deal_id: String,
    #[serde(rename = "BaseIRR")]
    base_irr: f64,
    #[serde(rename = "ConservativeIRR")]
    conservative_irr: f64,
    #[serde(rename = "OptimisticIRR")]
    optimistic_irr: f64,
    #[serde(rename = "BaseROI")]
    base_roi: f64,
    #[serde(rename = "BaseNPV")]
    base_npv: f64,
    #[serde(rename = "CapRate")]
    cap_rate: f64,
    #[serde(rename = "DSCR")]
    dscr: f64,
    #[serde(rename = "MeanSimROI")]
    mean_sim_roi: f64,
    #[serde(rename = "SimP5")]
    sim_p5: f64,
    #[serde(rename = "SimP95")]
    sim_p95: f64,
    #[serde(rename = "ProbPositive")]
    prob_positive: f64,
    #[serde(rename = "FlipROI")]
    flip_roi: f64,
    #[serde(rename = "HoldAnnualROI")]
    hold_annual_roi: f64,
    #[serde(rename = "BrrrrAnnualROI")]
    brrrr_annual_roi: f64,
    #[serde(rename = "BestExit")]
    best_exit: String,
}

struct Analyzers {
    scenarios: ScenarioRunner,
    simulator: MonteCarloSimulator,
    exits: ExitStrategyComparator,
}

fn analyze(analyzers: &Analyzers, record: &DealRecord, config: &SimulationConfig) -> AnalysisResult<SummaryRow> {
    let deal = &record.params;
    let metrics = analyzers.scenarios.metrics(deal)?;
    let simulation = analyzers.simulator.simulate(deal, config)?;
    let exits = analyzers.exits.compare(deal)?;

    let base = &metrics[&ScenarioKind::BaseCase];
    let annualized = |s: ExitStrategy| exits.get(s).map_or(0.0, |r| r.annualized_roi);

    Ok(SummaryRow {
        deal_id: record.deal_id.clone(),
        base_irr: base.irr,
        conservative_irr: metrics[&ScenarioKind::Conservative].irr,
        optimistic_irr: metrics[&ScenarioKind::Optimistic].irr,
        base_roi: base.roi,
        base_npv: base.npv,
        cap_rate: base.cap_rate,
        dscr: base.debt_coverage_ratio,
        mean_sim_roi: simulation.mean_roi,
        sim_p5: simulation.percentile_5,
        sim_p95: simulation.percentile_95,
        prob_positive: simulation.probability_positive,
        flip_roi: exits.get(ExitStrategy::Flip).map_or(0.0, |r| r.roi),
        hold_annual_roi: annualized(ExitStrategy::Hold),
        brrrr_annual_roi: annualized(ExitStrategy::Brrrr),
        best_exit: exits
            .recommended()
            .map_or_else(String::new, |r| r.strategy.to_string()),
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let assumptions = match &cli.assumptions {
        Some(dir) => Assumptions::from_csv_path(dir)
            .with_context(|| format!("loading assumptions from {}", dir.display()))?,
        None => Assumptions::default_underwriting(),
    };

    let deals = load_deals(&cli.deals).with_context(|| format!("loading deals from {}", cli.deals.display()))?;
    info!("Loaded {} deals from {}", deals.len(), cli.deals.display());

    let analyzers = Analyzers {
        scenarios: ScenarioRunner::with_assumptions(assumptions.clone()),
        simulator: MonteCarloSimulator::new(assumptions.clone()),
        exits: ExitStrategyComparator::new(assumptions),
    };

    let results: Vec<(String, AnalysisResult<SummaryRow>)> = deals
        .par_iter()
        .enumerate()
        .map(|(idx, record)| {
            let config = SimulationConfig::seeded(cli.trials, derive_seed(cli.seed, idx as u64));
            (record.deal_id.clone(), analyze(&analyzers, record, &config))
        })
        .collect();

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("creating {}", cli.output.display()))?;
    let mut written = 0usize;

    for (deal_id, result) in results {
        match result {
            Ok(row) => {
                writer.serialize(&row)?;
                written += 1;
            }
            Err(e) => warn!("Skipping deal {}: {}", deal_id, e),
        }
    }
    writer.flush()?;

    info!(
        "Wrote {} of {} deals to {} in {:?}",
        written,
        deals.len(),
        cli.output.display(),
        start.elapsed()
    );
    Ok(())
}
