//! Benchmark registry: the catalog of tasks and the evaluation entry points.
//!
//! This module provides functionality for:
//! - Registering task definitions under unique identifiers
//! - Listing tasks by tier, tag and id prefix
//! - Evaluating an agent on one task or a whole suite
//! - A process-wide registry with explicit initialization
//! - Building task variants from YAML suite manifests

pub mod builtin;
pub mod filter;
pub mod global;
pub mod manifest;

pub use builtin::builtin_registry;
pub use filter::TaskFilter;
pub use global::{global, initialize, initialize_with, reset_for_testing};
pub use manifest::{ManifestEntry, SuiteManifest};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::RegistryError;
use crate::generator::InstanceGenerator;
use crate::runner::{AgentFactory, EpisodeRunner, RunConfig};
use crate::scoring::{BenchmarkReport, ConfidenceLevel, SuiteReport, TaskFailure, WeightingScheme};
use crate::task::{TaskDefinition, TaskSpec};
use crate::trajectory::Trajectory;

/// Knobs for an evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EvaluationOptions {
    /// Replaces every task's default step budget when set.
    pub step_budget: Option<u32>,
    pub wall_clock_limit: Option<Duration>,
    pub confidence: ConfidenceLevel,
    pub weighting: WeightingScheme,
}

impl EvaluationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step_budget(mut self, step_budget: u32) -> Self {
        self.step_budget = Some(step_budget);
        self
    }

    pub fn with_wall_clock_limit(mut self, limit: Duration) -> Self {
        self.wall_clock_limit = Some(limit);
        self
    }

    /// Uses both budgets of `run_config` for every task.
    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.step_budget = Some(run_config.step_budget);
        self.wall_clock_limit = run_config.wall_clock_limit;
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_weighting(mut self, weighting: WeightingScheme) -> Self {
        self.weighting = weighting;
        self
    }

    /// Budgets for `spec`: the task defaults with any overrides applied.
    pub fn run_config_for(&self, spec: &TaskSpec) -> RunConfig {
        let mut config = RunConfig::for_task(spec);
        if let Some(step_budget) = self.step_budget {
            config.step_budget = step_budget;
        }
        if self.wall_clock_limit.is_some() {
            config.wall_clock_limit = self.wall_clock_limit;
        }
        config
    }
}

/// Catalog mapping task identifiers to definitions.
#[derive(Clone, Default)]
pub struct BenchmarkRegistry {
    tasks: BTreeMap<String, Arc<dyn TaskDefinition>>,
}

impl BenchmarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task after validating its spec.
    ///
    /// # Errors
    /// `DuplicateTask` if the id is taken, `Generator` if the spec is invalid.
    /// The registry is unchanged on error.
    pub fn register(&mut self, task: Arc<dyn TaskDefinition>) -> Result<(), RegistryError> {
        let spec = task.spec();
        spec.validate()?;
        if self.tasks.contains_key(&spec.id) {
            return Err(RegistryError::DuplicateTask(spec.id.clone()));
        }
        self.tasks.insert(spec.id.clone(), task);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.tasks.contains_key(task_id)
    }

    /// Matching task ids in lexicographic order.
    pub fn list_tasks(&self, filter: &TaskFilter) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|(_, task)| filter.matches(task.spec()))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn get(&self, task_id: &str) -> Result<Arc<dyn TaskDefinition>, RegistryError> {
        self.tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownTask(task_id.to_string()))
    }

    pub fn spec(&self, task_id: &str) -> Result<&TaskSpec, RegistryError> {
        self.tasks
            .get(task_id)
            .map(|task| task.spec())
            .ok_or_else(|| RegistryError::UnknownTask(task_id.to_string()))
    }

    /// Evaluates a fresh agent per seed on one task, with default options.
    pub fn evaluate(
        &self,
        task_id: &str,
        agents: &dyn AgentFactory,
        seeds: &[u64],
    ) -> Result<BenchmarkReport, RegistryError> {
        self.evaluate_with(task_id, agents, seeds, &EvaluationOptions::default())
    }

    /// Generates every instance up front, runs the episodes in seed order and
    /// aggregates them.
    ///
    /// Instance generation errors are configuration errors and fail the whole
    /// call; episode-level failures are recorded in the report.
    pub fn evaluate_with(
        &self,
        task_id: &str,
        agents: &dyn AgentFactory,
        seeds: &[u64],
        options: &EvaluationOptions,
    ) -> Result<BenchmarkReport, RegistryError> {
        self.evaluate_recorded(task_id, agents, seeds, options)
            .map(|(report, _)| report)
    }

    /// Like [`evaluate_with`](Self::evaluate_with), also returning every
    /// episode's trajectory in the order of `seeds`, ready for [`TrajectoryStorage`].
    ///
    /// [`TrajectoryStorage`]: crate::trajectory::TrajectoryStorage
    pub fn evaluate_recorded(
        &self,
        task_id: &str,
        agents: &dyn AgentFactory,
        seeds: &[u64],
        options: &EvaluationOptions,
    ) -> Result<(BenchmarkReport, Vec<Trajectory>), RegistryError> {
        let task = self.get(task_id)?;
        let instances = InstanceGenerator::new().generate_batch(task.as_ref(), seeds)?;
        let runner = EpisodeRunner::new(Arc::clone(&task), options.run_config_for(task.spec()));

        let (results, trajectories): (Vec<_>, Vec<_>) = instances
            .iter()
            .map(|instance| {
                let mut agent = agents.create();
                let outcome = runner.run(instance, agent.as_mut());
                (outcome.result, outcome.trajectory)
            })
            .unzip();

        let report = BenchmarkReport::from_results(task.spec().tier, &results, options.confidence)?;
        info!(
            task_id = task_id,
            episodes = report.episode_count(),
            success_rate = report.success_rate(),
            "Task evaluated"
        );
        Ok((report, trajectories))
    }

    /// Evaluates every task matching `filter`.
    ///
    /// A task that fails to evaluate is listed in the report's failures and
    /// the remaining tasks still run.
    pub fn evaluate_suite(
        &self,
        filter: &TaskFilter,
        agents: &dyn AgentFactory,
        seeds: &[u64],
        options: &EvaluationOptions,
    ) -> Result<SuiteReport, RegistryError> {
        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for task_id in self.list_tasks(filter) {
            match self.evaluate_with(&task_id, agents, seeds, options) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(task_id = %task_id, error = %e, "Task evaluation failed");
                    failures.push(TaskFailure {
                        task_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(SuiteReport::build(reports, failures, options.weighting)?)
    }
}

impl std::fmt::Debug for BenchmarkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkRegistry")
            .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
            .finish()
    }
}
