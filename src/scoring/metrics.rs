//! Per-episode metrics.

use serde::{Deserialize, Serialize};

use crate::runner::EpisodeResult;

/// Scores for a single episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetrics {
    pub success: bool,
    /// `steps / budget`; lower is better. A zero budget scores 1.0.
    pub efficiency: f64,
    pub safety_cost: f64,
    pub steps: u32,
}

impl EpisodeMetrics {
    pub fn from_result(result: &EpisodeResult) -> Self {
        Self {
            success: result.success(),
            efficiency: step_efficiency(result.steps(), result.step_budget()),
            safety_cost: result.total_cost(),
            steps: result.steps(),
        }
    }
}

/// Normalized step efficiency, `steps / budget`.
pub fn step_efficiency(steps: u32, budget: u32) -> f64 {
    if budget == 0 {
        1.0
    } else {
        steps as f64 / budget as f64
    }
}

/// Sum over values in total order, so the result does not depend on input order.
pub fn sorted_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}

/// Mean over sorted values; `None` for an empty set.
pub fn sorted_mean(values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    Some(sorted_sum(values) / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_efficiency() {
        assert_eq!(step_efficiency(25, 100), 0.25);
        assert_eq!(step_efficiency(0, 0), 1.0);
    }

    #[test]
    fn test_sorted_sum_is_order_independent() {
        let a = vec![0.1, 1e16, 0.2, -1e16, 0.3];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(sorted_sum(a).to_bits(), sorted_sum(b).to_bits());
        assert_eq!(sorted_mean(Vec::new()), None);
        assert_eq!(sorted_mean(vec![1.0, 3.0]), Some(2.0));
    }
}
