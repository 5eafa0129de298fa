//! Internal Rate of Return (IRR) and Net Present Value (NPV)
//!
//! IRR is solved with Newton-Raphson, falling back to bisection and finally to a
//! fixed default rate. The result carries a status so callers can tell a solved
//! rate from a fallback.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Starting point for Newton-Raphson
pub const INITIAL_GUESS: f64 = 0.10;

/// Rate reported when no root can be found
pub const FALLBACK_RATE: f64 = 0.10;

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: u32 = 100;
const MIN_RATE: f64 = -0.99;
const MAX_RATE: f64 = 10.0;
/// Largest |NPV| / Σ|cf| accepted as a root
const RESIDUAL_TOLERANCE: f64 = 1e-6;

/// How an IRR value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IrrStatus {
    /// Newton-Raphson met the tolerance
    Converged,
    /// Newton-Raphson failed; bisection bracketed the root
    Bisection,
    /// Derivative vanished and no bracket existed; last Newton estimate returned
    Stalled,
    /// No root found (or no sign change); `FALLBACK_RATE` returned
    Fallback,
}

/// IRR result with solver diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Periodic rate as a decimal (0.05 = 5%)
    pub rate: f64,
    pub status: IrrStatus,
    pub iterations: u32,
}

impl IrrSolution {
    fn fallback(iterations: u32) -> Self {
        Self {
            rate: FALLBACK_RATE,
            status: IrrStatus::Fallback,
            iterations,
        }
    }

    /// True when the rate is an actual root of the NPV function
    pub fn is_root(&self) -> bool {
        matches!(self.status, IrrStatus::Converged | IrrStatus::Bisection)
    }

    /// The rate, or `NonConvergence` if the solver had to fall back
    pub fn converged(self) -> AnalysisResult<f64> {
        if self.is_root() {
            Ok(self.rate)
        } else {
            Err(AnalysisError::NonConvergence {
                iterations: self.iterations,
            })
        }
    }
}

/// Net present value: `Σ cf_t / (1 + rate)^t`, with t = 0 for the first flow
pub fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Internal rate of return as a decimal, `FALLBACK_RATE` if none can be found
pub fn irr(cashflows: &[f64]) -> f64 {
    solve_irr(cashflows).rate
}

/// Solve for IRR with Newton-Raphson from `INITIAL_GUESS`
///
/// Stops when the step is below 1e-10 or after 100 iterations. Numerical
/// trouble, or a step pinned at the [-99%, 1000%] search bounds, hands over to
/// bisection on that interval; if that has no bracket the solver reports
/// `Stalled` (vanishing derivative) or `Fallback`.
pub fn solve_irr(cashflows: &[f64]) -> IrrSolution {
    solve_irr_with_guess(cashflows, INITIAL_GUESS)
}

/// [`solve_irr`] starting Newton-Raphson from `guess`
pub fn solve_irr_with_guess(cashflows: &[f64], guess: f64) -> IrrSolution {
    // A root requires at least one sign change
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return IrrSolution::fallback(0);
    }

    let scale: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
    let mut rate = guess.clamp(MIN_RATE, MAX_RATE);

    for iteration in 1..=MAX_ITERATIONS {
        let (value, derivative) = npv_and_derivative(cashflows, rate);

        if !value.is_finite() || !derivative.is_finite() {
            return bisection(cashflows, iteration).unwrap_or_else(|| IrrSolution::fallback(iteration));
        }

        if derivative.abs() < 1e-20 {
            return bisection(cashflows, iteration).unwrap_or(IrrSolution {
                rate,
                status: IrrStatus::Stalled,
                iterations: iteration,
            });
        }

        let unclamped = rate - value / derivative;
        if !(MIN_RATE..=MAX_RATE).contains(&unclamped) {
            // Root is past a bound or the step overshot; only a bracket can tell
            return bisection(cashflows, iteration).unwrap_or_else(|| IrrSolution::fallback(iteration));
        }

        if (unclamped - rate).abs() < TOLERANCE {
            if npv(cashflows, unclamped).abs() > RESIDUAL_TOLERANCE * scale {
                return bisection(cashflows, iteration).unwrap_or_else(|| IrrSolution::fallback(iteration));
            }
            return IrrSolution {
                rate: unclamped,
                status: IrrStatus::Converged,
                iterations: iteration,
            };
        }

        rate = unclamped;
    }

    bisection(cashflows, MAX_ITERATIONS).unwrap_or_else(|| IrrSolution::fallback(MAX_ITERATIONS))
}

/// NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut derivative = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        value += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            derivative -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (value, derivative)
}

fn bisection(cashflows: &[f64], prior_iterations: u32) -> Option<IrrSolution> {
    let mut low = MIN_RATE;
    let mut high = MAX_RATE;
    let mut npv_low = npv(cashflows, low);
    let npv_high = npv(cashflows, high);

    if !npv_low.is_finite() || !npv_high.is_finite() || npv_low * npv_high > 0.0 {
        return None;
    }

    for i in 1..=1000 {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(IrrSolution {
                rate: mid,
                status: IrrStatus::Bisection,
                iterations: prior_iterations + i,
            });
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}
