//! Suite-level aggregation across tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::error::ScoringError;

use super::aggregate::BenchmarkReport;

/// How per-task success rates combine into a suite score.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum WeightingScheme {
    /// Plain mean over tasks.
    #[default]
    Unweighted,
    /// Weighted mean with one weight per difficulty tier.
    TierWeighted { easy: f64, medium: f64, hard: f64 },
}

impl WeightingScheme {
    /// Tier weights 1, 2 and 3.
    pub fn tier_defaults() -> Self {
        WeightingScheme::TierWeighted {
            easy: DifficultyTier::Easy.default_weight(),
            medium: DifficultyTier::Medium.default_weight(),
            hard: DifficultyTier::Hard.default_weight(),
        }
    }

    pub fn weight(&self, tier: DifficultyTier) -> f64 {
        match *self {
            WeightingScheme::Unweighted => 1.0,
            WeightingScheme::TierWeighted { easy, medium, hard } => match tier {
                DifficultyTier::Easy => easy,
                DifficultyTier::Medium => medium,
                DifficultyTier::Hard => hard,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if let WeightingScheme::TierWeighted { easy, medium, hard } = *self {
            if [easy, medium, hard].iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(ScoringError::InvalidWeights(
                    "tier weights must be finite and non-negative".to_string(),
                ));
            }
            if easy + medium + hard <= 0.0 {
                return Err(ScoringError::InvalidWeights(
                    "at least one tier weight must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// A task that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFailure {
    pub task_id: String,
    pub error: String,
}

/// Reports for every evaluated task plus the combined score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteReport {
    tasks: Vec<BenchmarkReport>,
    weighting: WeightingScheme,
    success_rate: Option<f64>,
    failures: Vec<TaskFailure>,
    generated_at: DateTime<Utc>,
}

impl SuiteReport {
    /// Combines task reports. `success_rate` is `None` when no task was evaluated
    /// or every evaluated task carries zero weight.
    pub fn build(
        mut tasks: Vec<BenchmarkReport>,
        mut failures: Vec<TaskFailure>,
        weighting: WeightingScheme,
    ) -> Result<Self, ScoringError> {
        weighting.validate()?;
        tasks.sort_by(|a, b| a.task_id().cmp(b.task_id()));
        failures.sort_by(|a, b| a.task_id.cmp(&b.task_id));

        let mut weighted: Vec<f64> = Vec::with_capacity(tasks.len());
        let mut weights: Vec<f64> = Vec::with_capacity(tasks.len());
        for report in &tasks {
            let w = weighting.weight(report.tier());
            weighted.push(w * report.success_rate());
            weights.push(w);
        }
        let total_weight = super::metrics::sorted_sum(weights);
        let success_rate = if total_weight > 0.0 {
            Some(super::metrics::sorted_sum(weighted) / total_weight)
        } else {
            None
        };

        Ok(Self {
            tasks,
            weighting,
            success_rate,
            failures,
            generated_at: Utc::now(),
        })
    }

    /// Task reports ordered by task id.
    pub fn tasks(&self) -> &[BenchmarkReport] {
        &self.tasks
    }

    pub fn task(&self, task_id: &str) -> Option<&BenchmarkReport> {
        self.tasks.iter().find(|r| r.task_id() == task_id)
    }

    pub fn weighting(&self) -> WeightingScheme {
        self.weighting
    }

    pub fn success_rate(&self) -> Option<f64> {
        self.success_rate
    }

    pub fn failures(&self) -> &[TaskFailure] {
        &self.failures
    }

    pub fn total_episodes(&self) -> usize {
        self.tasks.iter().map(|r| r.episode_count()).sum()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{EpisodeResult, TerminationReason};
    use crate::scoring::ConfidenceLevel;

    fn report(task: &str, tier: DifficultyTier, successes: usize, total: usize) -> BenchmarkReport {
        let results: Vec<EpisodeResult> = (0..total)
            .map(|i| {
                let reason = if i < successes {
                    TerminationReason::GoalReached
                } else {
                    TerminationReason::StepBudgetExhausted
                };
                EpisodeResult::aborted(task, i as u64, "test", 100, reason)
            })
            .collect();
        BenchmarkReport::from_results(tier, &results, ConfidenceLevel::P95).expect("aggregation should succeed")
    }

    #[test]
    fn test_unweighted_mean() {
        let suite = SuiteReport::build(
            vec![
                report("b", DifficultyTier::Hard, 0, 2),
                report("a", DifficultyTier::Easy, 2, 2),
            ],
            Vec::new(),
            WeightingScheme::Unweighted,
        )
        .expect("suite should build");
        assert_eq!(suite.success_rate(), Some(0.5));
        assert_eq!(suite.tasks()[0].task_id(), "a");
        assert_eq!(suite.total_episodes(), 4);
    }

    #[test]
    fn test_tier_weighted_mean() {
        let suite = SuiteReport::build(
            vec![
                report("easy", DifficultyTier::Easy, 1, 1),
                report("hard", DifficultyTier::Hard, 0, 1),
            ],
            vec![TaskFailure {
                task_id: "broken".into(),
                error: "bad".into(),
            }],
            WeightingScheme::tier_defaults(),
        )
        .expect("suite should build");
        let rate = suite.success_rate().expect("rate should exist");
        assert!((rate - 0.25).abs() < 1e-12);
        assert_eq!(suite.failures().len(), 1);
        assert!(matches!(suite.weighting(), WeightingScheme::TierWeighted { .. }));
    }

    #[test]
    fn test_invalid_weights() {
        let scheme = WeightingScheme::TierWeighted {
            easy: -1.0,
            medium: 1.0,
            hard: 1.0,
        };
        assert!(matches!(
            SuiteReport::build(Vec::new(), Vec::new(), scheme),
            Err(ScoringError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_empty_suite_has_no_rate() {
        let suite = SuiteReport::build(Vec::new(), Vec::new(), WeightingScheme::Unweighted)
            .expect("suite should build");
        assert_eq!(suite.success_rate(), None);
    }
}
