//! Aggregate statistics over simulation trials

use serde::{Deserialize, Serialize};

use super::trial::SimulationTrial;

/// ROI (percent) counted as meeting the target return
pub const TARGET_ROI_PCT: f64 = 15.0;

/// Mergeable count / sum / sum-of-squares accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    pub fn merge(&mut self, other: &RunningStats) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Population standard deviation
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.count as f64 - mean * mean).max(0.0).sqrt()
    }
}

/// Per-batch accumulation of trial results
#[derive(Debug, Clone, Default)]
pub struct TrialAccumulator {
    pub roi: RunningStats,
    pub total_return: RunningStats,
    pub final_value: RunningStats,
    pub total_cash_flow: RunningStats,
    pub positive: u64,
    pub above_target: u64,
    /// Every ROI seen, kept for exact percentiles
    pub rois: Vec<f64>,
}

impl TrialAccumulator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rois: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    pub fn push(&mut self, trial: &SimulationTrial) {
        self.roi.push(trial.roi);
        self.total_return.push(trial.total_return);
        self.final_value.push(trial.final_value);
        self.total_cash_flow.push(trial.total_cash_flow);

        if trial.roi > 0.0 {
            self.positive += 1;
        }
        if trial.roi > TARGET_ROI_PCT {
            self.above_target += 1;
        }
        self.rois.push(trial.roi);
    }

    /// Fold another accumulator in; call in batch order for reproducible sums
    pub fn merge(&mut self, other: TrialAccumulator) {
        self.roi.merge(&other.roi);
        self.total_return.merge(&other.total_return);
        self.final_value.merge(&other.final_value);
        self.total_cash_flow.merge(&other.total_cash_flow);
        self.positive += other.positive;
        self.above_target += other.above_target;
        self.rois.extend(other.rois);
    }

    pub fn into_summary(mut self, seed: Option<u64>) -> SimulationSummary {
        let n = self.roi.count;
        let probability = |hits: u64| if n == 0 { 0.0 } else { hits as f64 / n as f64 };

        self.rois.sort_by(|a, b| a.total_cmp(b));

        SimulationSummary {
            trials: n as usize,
            seed,
            mean_roi: self.roi.mean(),
            median_roi: percentile(&self.rois, 0.50),
            std_roi: self.roi.std_dev(),
            percentile_5: percentile(&self.rois, 0.05),
            percentile_95: percentile(&self.rois, 0.95),
            min_roi: self.rois.first().copied().unwrap_or(0.0),
            max_roi: self.rois.last().copied().unwrap_or(0.0),
            probability_positive: probability(self.positive),
            probability_above_target: probability(self.above_target),
            mean_total_return: self.total_return.mean(),
            mean_final_value: self.final_value.mean(),
            mean_total_cash_flow: self.total_cash_flow.mean(),
        }
    }
}

/// Linear-interpolated percentile of sorted data, `p` in [0, 1]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// ROI distribution over all trials (ROI values in percent, probabilities as fractions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub trials: usize,
    /// Master seed the run used
    pub seed: Option<u64>,
    pub mean_roi: f64,
    pub median_roi: f64,
    pub std_roi: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub min_roi: f64,
    pub max_roi: f64,
    /// P(roi > 0)
    pub probability_positive: f64,
    /// P(roi > 15%)
    pub probability_above_target: f64,
    pub mean_total_return: f64,
    pub mean_final_value: f64,
    pub mean_total_cash_flow: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_percentile_interpolates() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile(&data, 0.5), 3.0);
        assert_relative_eq!(percentile(&data, 0.0), 1.0);
        assert_relative_eq!(percentile(&data, 1.0), 5.0);
        assert_relative_eq!(percentile(&data, 0.05), 1.2, epsilon = 1e-12);
        assert_relative_eq!(percentile(&data, 0.95), 4.8, epsilon = 1e-12);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_running_stats_merge_matches_single_pass() {
        let values = [3.0, -1.0, 4.0, 1.0, 5.0, 9.0];
        let mut whole = RunningStats::default();
        values.iter().for_each(|&v| whole.push(v));

        let mut left = RunningStats::default();
        let mut right = RunningStats::default();
        values[..2].iter().for_each(|&v| left.push(v));
        values[2..].iter().for_each(|&v| right.push(v));
        left.merge(&right);

        assert_eq!(left.count, whole.count);
        assert_relative_eq!(left.mean(), whole.mean());
        assert_relative_eq!(left.std_dev(), whole.std_dev(), epsilon = 1e-12);
        // Population std of the sample
        assert_relative_eq!(whole.std_dev(), (133.0f64 / 6.0 -(21.0f64 / 6.0).powi(2)).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_accumulator() {
        let summary = TrialAccumulator::default().into_summary(None);
        assert_eq!(summary.trials, 0);
        assert_eq!(summary.mean_roi, 0.0);
        assert_eq!(summary.probability_positive, 0.0);
    }
}
