//! Drives agents through episodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::generator::TaskInstance;
use crate::metrics::{EpisodeSample, MetricsCollector};
use crate::task::TaskDefinition;

use super::agents::Agent;
use super::config::RunConfig;
use super::episode::Episode;
use super::result::EpisodeOutcome;
use super::state::EpisodeState;

/// Shared flag asking a running episode to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs complete episodes of one task.
///
/// `run` never fails: environment faults, cancellation and budget
/// exhaustion all end up as terminal states in the returned outcome.
#[derive(Clone)]
pub struct EpisodeRunner {
    task: Arc<dyn TaskDefinition>,
    config: RunConfig,
    metrics: MetricsCollector,
}

impl EpisodeRunner {
    pub fn new(task: Arc<dyn TaskDefinition>, config: RunConfig) -> Self {
        Self {
            task,
            config,
            metrics: MetricsCollector::new(),
        }
    }

    /// Runner using the task's default step budget.
    pub fn for_task(task: Arc<dyn TaskDefinition>) -> Self {
        let config = RunConfig::for_task(task.spec());
        Self::new(task, config)
    }

    pub fn task(&self) -> &Arc<dyn TaskDefinition> {
        &self.task
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(&self, instance: &TaskInstance, agent: &mut dyn Agent) -> EpisodeOutcome {
        self.run_with_cancel(instance, agent, &CancelToken::new())
    }

    /// Like [`run`](Self::run), checking `cancel` before every step.
    pub fn run_with_cancel(
        &self,
        instance: &TaskInstance,
        agent: &mut dyn Agent,
        cancel: &CancelToken,
    ) -> EpisodeOutcome {
        self.metrics.episode_started();
        agent.reset(instance);

        let mut episode = Episode::new(Arc::clone(&self.task), instance, self.config, agent.name());
        if let Ok(mut observation) = episode.reset() {
            while episode.state() == EpisodeState::Running {
                if cancel.is_cancelled() {
                    debug!(episode_id = %episode.id(), "Cancellation requested");
                    episode.cancel();
                    break;
                }
                let action = agent.act(&observation);
                match episode.step(action) {
                    Ok(transition) => observation = transition.observation,
                    Err(_) => break,
                }
            }
        }

        let outcome = episode.finish();
        self.metrics.record_episode(EpisodeSample {
            task_id: outcome.result.task_id(),
            outcome: outcome.result.state().as_str(),
            steps: outcome.result.steps(),
            duration_secs: outcome.result.duration_ms() as f64 / 1000.0,
            safety_violations: outcome.trajectory.steps().iter().filter(|s| s.cost > 0.0).count() as u32,
        });
        outcome
    }
}
