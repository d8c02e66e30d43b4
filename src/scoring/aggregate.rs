//! Per-task aggregation of episode results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::error::ScoringError;
use crate::runner::EpisodeResult;

use super::interval::{wilson_interval, ConfidenceInterval, ConfidenceLevel};
use super::metrics::{sorted_mean, EpisodeMetrics};

/// Frozen aggregate over all episodes of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    task_id: String,
    tier: DifficultyTier,
    agent: String,
    episode_count: usize,
    success_count: usize,
    success_rate: f64,
    interval: ConfidenceInterval,
    mean_efficiency: Option<f64>,
    mean_safety_cost: f64,
    mean_steps: f64,
    step_budget: u32,
    seeds: Vec<u64>,
    terminations: BTreeMap<String, usize>,
    episodes: Vec<EpisodeResult>,
    generated_at: DateTime<Utc>,
}

impl BenchmarkReport {
    /// Aggregates results for a single task.
    ///
    /// The report does not depend on the order of `results`: floating sums
    /// run over sorted values and the episode list is sorted by seed.
    pub fn from_results(
        tier: DifficultyTier,
        results: &[EpisodeResult],
        level: ConfidenceLevel,
    ) -> Result<Self, ScoringError> {
        let first = results.first().ok_or(ScoringError::EmptyResults)?;
        if let Some(other) = results.iter().find(|r| r.task_id() != first.task_id()) {
            return Err(ScoringError::MixedTasks {
                expected: first.task_id().to_string(),
                found: other.task_id().to_string(),
            });
        }

        let mut episodes = results.to_vec();
        episodes.sort_by(|a, b| {
            (a.seed(), a.episode_id()).cmp(&(b.seed(), b.episode_id()))
        });

        let metrics: Vec<EpisodeMetrics> = episodes.iter().map(EpisodeMetrics::from_result).collect();
        let episode_count = metrics.len();
        let success_count = metrics.iter().filter(|m| m.success).count();

        let mean_efficiency = sorted_mean(
            metrics
                .iter()
                .filter(|m| m.success)
                .map(|m| m.efficiency)
                .collect(),
        );
        let mean_safety_cost = sorted_mean(metrics.iter().map(|m| m.safety_cost).collect()).unwrap_or(0.0);
        let mean_steps = sorted_mean(metrics.iter().map(|m| m.steps as f64).collect()).unwrap_or(0.0);

        let mut terminations = BTreeMap::new();
        for result in &episodes {
            let code = result.termination().map(|r| r.code()).unwrap_or("none");
            *terminations.entry(code.to_string()).or_insert(0) += 1;
        }

        let mut agents: Vec<&str> = episodes.iter().map(|r| r.agent()).collect();
        agents.sort_unstable();
        agents.dedup();

        Ok(Self {
            task_id: first.task_id().to_string(),
            tier,
            agent: agents.join(","),
            episode_count,
            success_count,
            success_rate: success_count as f64 / episode_count as f64,
            interval: wilson_interval(success_count, episode_count, level),
            mean_efficiency,
            mean_safety_cost,
            mean_steps,
            step_budget: episodes.iter().map(|r| r.step_budget()).max().unwrap_or(0),
            seeds: episodes.iter().map(|r| r.seed()).collect(),
            terminations,
            episodes,
            generated_at: Utc::now(),
        })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    /// Agent name, or a comma-joined list if episodes came from several agents.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn interval(&self) -> &ConfidenceInterval {
        &self.interval
    }

    /// Mean `steps / budget` over successful episodes only.
    pub fn mean_efficiency(&self) -> Option<f64> {
        self.mean_efficiency
    }

    pub fn mean_safety_cost(&self) -> f64 {
        self.mean_safety_cost
    }

    pub fn mean_steps(&self) -> f64 {
        self.mean_steps
    }

    pub fn step_budget(&self) -> u32 {
        self.step_budget
    }

    /// Evaluated seeds in ascending order.
    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    /// Episode count per termination reason code.
    pub fn terminations(&self) -> &BTreeMap<String, usize> {
        &self.terminations
    }

    pub fn episodes(&self) -> &[EpisodeResult] {
        &self.episodes
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::TerminationReason;

    fn result(task: &str, seed: u64, reason: TerminationReason) -> EpisodeResult {
        EpisodeResult::aborted(task, seed, "test", 100, reason)
    }

    #[test]
    fn test_empty_results() {
        let err = BenchmarkReport::from_results(DifficultyTier::Easy, &[], ConfidenceLevel::P95).unwrap_err();
        assert_eq!(err, ScoringError::EmptyResults);
    }

    #[test]
    fn test_mixed_tasks() {
        let results = vec![
            result("a", 1, TerminationReason::Cancelled),
            result("b", 2, TerminationReason::Cancelled),
        ];
        let err = BenchmarkReport::from_results(DifficultyTier::Easy, &results, ConfidenceLevel::P95).unwrap_err();
        assert!(matches!(err, ScoringError::MixedTasks { .. }));
    }

    #[test]
    fn test_aggregate_counts_and_order() {
        let results = vec![
            result("t", 3, TerminationReason::GoalReached),
            result("t", 1, TerminationReason::StepBudgetExhausted),
            result("t", 2, TerminationReason::GoalReached),
        ];
        let report = BenchmarkReport::from_results(DifficultyTier::Medium, &results, ConfidenceLevel::P95)
            .expect("aggregation should succeed");

        assert_eq!(report.episode_count(), 3);
        assert_eq!(report.success_count(), 2);
        assert!((report.success_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(report.seeds(), &[1, 2, 3]);
        assert_eq!(report.terminations().get("goal_reached"), Some(&2));
        assert_eq!(report.mean_efficiency(), Some(0.0));
        assert_eq!(report.agent(), "test");

        let mut reversed = results.clone();
        reversed.reverse();
        let again = BenchmarkReport::from_results(DifficultyTier::Medium, &reversed, ConfidenceLevel::P95)
            .expect("aggregation should succeed");
        assert_eq!(again.success_rate().to_bits(), report.success_rate().to_bits());
        assert_eq!(again.interval(), report.interval());
        assert_eq!(again.episodes(), report.episodes());
    }

    #[test]
    fn test_no_successes_has_no_efficiency() {
        let results = vec![result("t", 1, TerminationReason::Cancelled)];
        let report = BenchmarkReport::from_results(DifficultyTier::Easy, &results, ConfidenceLevel::P90)
            .expect("aggregation should succeed");
        assert_eq!(report.mean_efficiency(), None);
        assert!(report.interval().upper > 0.0);
    }
}
