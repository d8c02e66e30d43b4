//! Flat key/value records for line-oriented export.

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::scoring::{BenchmarkReport, SuiteReport, WeightingScheme};

/// Per-task summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub tier: DifficultyTier,
    pub agent: String,
    pub episode_count: usize,
    pub success_count: usize,
    pub success_rate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence: f64,
    pub mean_efficiency: Option<f64>,
    pub mean_safety_cost: f64,
    pub mean_steps: f64,
    pub step_budget: u32,
    pub seeds: Vec<u64>,
}

impl From<&BenchmarkReport> for TaskRecord {
    fn from(report: &BenchmarkReport) -> Self {
        let interval = report.interval();
        Self {
            task_id: report.task_id().to_string(),
            tier: report.tier(),
            agent: report.agent().to_string(),
            episode_count: report.episode_count(),
            success_count: report.success_count(),
            success_rate: report.success_rate(),
            ci_lower: interval.lower,
            ci_upper: interval.upper,
            confidence: interval.level.as_f64(),
            mean_efficiency: report.mean_efficiency(),
            mean_safety_cost: report.mean_safety_cost(),
            mean_steps: report.mean_steps(),
            step_budget: report.step_budget(),
            seeds: report.seeds().to_vec(),
        }
    }
}

/// Suite summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteRecord {
    pub task_count: usize,
    pub failed_tasks: Vec<String>,
    pub total_episodes: usize,
    pub success_rate: Option<f64>,
    pub weighting: WeightingScheme,
}

/// One JSON-lines record, tagged by `record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum ReportRecord {
    Task(TaskRecord),
    Suite(SuiteRecord),
}

/// One task record per evaluated task, then the suite summary.
pub fn suite_records(suite: &SuiteReport) -> Vec<ReportRecord> {
    let mut records: Vec<ReportRecord> = suite
        .tasks()
        .iter()
        .map(|report| ReportRecord::Task(report.into()))
        .collect();
    records.push(ReportRecord::Suite(SuiteRecord {
        task_count: suite.tasks().len(),
        failed_tasks: suite.failures().iter().map(|f| f.task_id.clone()).collect(),
        total_episodes: suite.total_episodes(),
        success_rate: suite.success_rate(),
        weighting: suite.weighting(),
    }));
    records
}
