//! Scenario projection engine and return-metrics solver

mod state;
mod engine;
mod cashflows;
mod irr;
mod metrics;

pub use state::ProjectionState;
pub use engine::ProjectionEngine;
pub use cashflows::{ProjectionRow, ProjectionResult, ProjectionSummary};
pub use irr::{irr, npv, solve_irr, solve_irr_with_guess, IrrSolution, IrrStatus, FALLBACK_RATE, INITIAL_GUESS};
pub use metrics::{investor_cash_flows, ReturnMetrics};
pub(crate) use metrics::ratio;
