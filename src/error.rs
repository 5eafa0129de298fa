//! Error types shared by the analysis engines and loaders

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Invalid trial count: {0} (at least 1 trial is required)")]
    InvalidTrialCount(usize),

    #[error("IRR did not converge after {iterations} iterations")]
    NonConvergence { iterations: u32 },

    #[error("Invalid distribution for {variable}: mean={mean}, std_dev={std_dev}")]
    InvalidDistribution {
        variable: &'static str,
        mean: f64,
        std_dev: f64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AnalysisError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// True for errors caused by caller-supplied values rather than numerics or IO
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidInput { .. } | AnalysisError::InvalidTrialCount(_)
        )
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
