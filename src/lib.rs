//! Deal Projection - return analysis engine for single real-estate deals
//!
//! This library provides:
//! - Ten-year cash-flow projections under Conservative / Base Case / Optimistic scenarios
//! - Return metrics (IRR, NPV, ROI, cash-on-cash, DSCR, cap rate)
//! - Seeded, parallel Monte Carlo simulation of ROI
//! - One-at-a-time sensitivity analysis
//! - Flip / Hold / BRRRR exit strategy comparison

pub mod error;
pub mod deal;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod simulation;
pub mod sensitivity;
pub mod exit;

// Re-export commonly used types
pub use error::{AnalysisError, AnalysisResult};
pub use deal::{DealParameters, DealRecord};
pub use assumptions::{Assumptions, ScenarioKind};
pub use projection::{ProjectionEngine, ProjectionResult, ProjectionRow, ReturnMetrics, irr, npv, solve_irr};
pub use scenario::ScenarioRunner;
pub use simulation::{MonteCarloSimulator, SimulationConfig, SimulationSummary};
pub use sensitivity::{SensitivityAnalyzer, SensitivityReport, SensitivityVariable};
pub use exit::{ExitComparison, ExitStrategy, ExitStrategyComparator, ExitStrategyResult};
