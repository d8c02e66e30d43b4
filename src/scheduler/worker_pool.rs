//! Worker pool for running episodes in parallel.
//!
//! Episodes run on tokio's blocking pool, at most `num_workers` at a time.
//! Results are collected in completion order and aggregated order-independently,
//! so a parallel evaluation scores the same as a sequential one.
//!
//! # Features
//!
//! - Configurable number of workers
//! - Optional per-episode timeout that cancels the episode cooperatively,
//!   abandoning workers that stay blocked past a grace period
//! - Panicking agents recorded as failed episodes
//! - Pool statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::{GeneratorError, RegistryError, ScoringError};
use crate::generator::{InstanceGenerator, TaskInstance};
use crate::metrics::MetricsCollector;
use crate::registry::{BenchmarkRegistry, EvaluationOptions, TaskFilter};
use crate::runner::{
    AgentFactory, CancelToken, EpisodeResult, EpisodeRunner, EpisodeState, RunConfig,
    TerminationReason,
};
use crate::scoring::{BenchmarkReport, SuiteReport, TaskFailure};
use crate::task::TaskDefinition;

/// Errors that can occur in the worker pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),
}

/// Configuration for the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of episodes running at once.
    pub num_workers: usize,
    /// Cancels an episode that runs longer than this.
    pub episode_timeout: Option<Duration>,
    /// How long a cancelled episode may take to stop before it is abandoned.
    pub cancel_grace: Duration,
}

/// Default for [`PoolConfig::cancel_grace`].
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_millis(100);

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            episode_timeout: None,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }
}

impl PoolConfig {
    pub fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            ..Default::default()
        }
    }

    pub fn with_episode_timeout(mut self, timeout: Duration) -> Self {
        self.episode_timeout = Some(timeout);
        self
    }

    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    pub fn validate(&self) -> Result<(), PoolError> {
        if self.num_workers == 0 {
            return Err(PoolError::InvalidConfig("num_workers must be at least 1".to_string()));
        }
        if self.episode_timeout == Some(Duration::ZERO) {
            return Err(PoolError::InvalidConfig("episode_timeout must be positive".to_string()));
        }
        Ok(())
    }
}

/// Snapshot of pool statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub num_workers: usize,
    /// Episodes currently running.
    pub active: u64,
    /// Episodes that reached the goal.
    pub completed: u64,
    pub failed: u64,
    pub timed_out: u64,
}

impl PoolStats {
    pub fn total_processed(&self) -> u64 {
        self.completed + self.failed + self.timed_out
    }
}

#[derive(Default)]
struct SharedPoolStats {
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    active: AtomicU64,
}

impl SharedPoolStats {
    fn record(&self, result: &EpisodeResult) {
        let counter = match result.state() {
            EpisodeState::Succeeded => &self.completed,
            EpisodeState::TimedOut => &self.timed_out,
            _ => &self.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_active(&self) -> u64 {
        self.active.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn decrement_active(&self) -> u64 {
        self.active.fetch_sub(1, Ordering::SeqCst) - 1
    }

    fn snapshot(&self, num_workers: usize) -> PoolStats {
        PoolStats {
            num_workers,
            active: self.active.load(Ordering::SeqCst),
            completed: self.completed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            timed_out: self.timed_out.load(Ordering::SeqCst),
        }
    }
}

/// Runs the episodes of an evaluation concurrently.
pub struct ParallelEvaluator {
    config: PoolConfig,
    semaphore: Arc<Semaphore>,
    stats: Arc<SharedPoolStats>,
    metrics: MetricsCollector,
}

impl ParallelEvaluator {
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self {
            config,
            semaphore: Arc::new(Semaphore::new(config.num_workers)),
            stats: Arc::new(SharedPoolStats::default()),
            metrics: MetricsCollector::new(),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn stats(&self) -> PoolStats {
        self.stats.snapshot(self.config.num_workers)
    }

    /// Runs one episode per instance with a fresh agent each.
    ///
    /// Results come back in completion order. Every instance yields exactly
    /// one result, including episodes whose worker panicked.
    pub async fn run_episodes(
        &self,
        task: Arc<dyn TaskDefinition>,
        run_config: RunConfig,
        instances: Vec<TaskInstance>,
        agents: Arc<dyn AgentFactory>,
    ) -> Vec<EpisodeResult> {
        let runner = EpisodeRunner::new(task, run_config);
        let mut pending = FuturesUnordered::new();

        for instance in instances {
            let semaphore = Arc::clone(&self.semaphore);
            let stats = Arc::clone(&self.stats);
            let metrics = self.metrics.clone();
            let runner = runner.clone();
            let agents = Arc::clone(&agents);
            let timeout = self.config.episode_timeout;
            let grace = self.config.cancel_grace;

            pending.push(async move {
                let task_id = instance.task_id.clone();
                let seed = instance.seed;
                let mut agent = agents.create();
                let agent_name = agent.name().to_string();

                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return EpisodeResult::aborted(
                            task_id,
                            seed,
                            agent_name,
                            run_config.step_budget,
                            TerminationReason::WorkerCrashed(e.to_string()),
                        );
                    }
                };
                metrics.update_workers(stats.increment_active() as usize);

                let token = CancelToken::new();
                let worker_token = token.clone();
                let mut handle = tokio::task::spawn_blocking(move || {
                    runner
                        .run_with_cancel(&instance, agent.as_mut(), &worker_token)
                        .result
                });

                let joined = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, &mut handle).await {
                        Ok(joined) => Some(joined),
                        Err(_) => {
                            debug!(task_id = %task_id, seed = seed, "Episode timed out, cancelling");
                            token.cancel();
                            tokio::time::timeout(grace, &mut handle).await.ok()
                        }
                    },
                    None => Some(handle.await),
                };
                metrics.update_workers(stats.decrement_active() as usize);

                let result = match joined {
                    Some(Ok(result)) => result,
                    // Dropping the handle detaches the blocked worker; it stops at its next step.
                    None => {
                        warn!(task_id = %task_id, seed = seed, "Episode ignored cancellation, abandoning worker");
                        EpisodeResult::aborted(
                            task_id,
                            seed,
                            agent_name,
                            run_config.step_budget,
                            TerminationReason::Cancelled,
                        )
                    }
                    Some(Err(e)) => {
                        warn!(task_id = %task_id, seed = seed, error = %e, "Episode worker crashed");
                        EpisodeResult::aborted(
                            task_id,
                            seed,
                            agent_name,
                            run_config.step_budget,
                            TerminationReason::WorkerCrashed(e.to_string()),
                        )
                    }
                };
                stats.record(&result);
                result
            });
        }

        let mut results = Vec::with_capacity(pending.len());
        while let Some(result) = pending.next().await {
            results.push(result);
        }
        results
    }

    /// Parallel counterpart of [`BenchmarkRegistry::evaluate_with`].
    pub async fn evaluate(
        &self,
        registry: &BenchmarkRegistry,
        task_id: &str,
        agents: Arc<dyn AgentFactory>,
        seeds: &[u64],
        options: &EvaluationOptions,
    ) -> Result<BenchmarkReport, PoolError> {
        let task = registry.get(task_id)?;
        let instances = InstanceGenerator::new().generate_batch(task.as_ref(), seeds)?;
        let run_config = options.run_config_for(task.spec());

        let results = self
            .run_episodes(Arc::clone(&task), run_config, instances, agents)
            .await;
        let report = BenchmarkReport::from_results(task.spec().tier, &results, options.confidence)?;

        info!(
            task_id = task_id,
            episodes = report.episode_count(),
            success_rate = report.success_rate(),
            workers = self.config.num_workers,
            "Task evaluated in parallel"
        );
        Ok(report)
    }

    /// Parallel counterpart of [`BenchmarkRegistry::evaluate_suite`].
    pub async fn evaluate_suite(
        &self,
        registry: &BenchmarkRegistry,
        filter: &TaskFilter,
        agents: Arc<dyn AgentFactory>,
        seeds: &[u64],
        options: &EvaluationOptions,
    ) -> Result<SuiteReport, PoolError> {
        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for task_id in registry.list_tasks(filter) {
            match self
                .evaluate(registry, &task_id, Arc::clone(&agents), seeds, options)
                .await
            {
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
