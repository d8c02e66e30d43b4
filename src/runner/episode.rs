//! The episode state machine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::env::{Action, EnvironmentAdapter, Observation, Transition};
use crate::error::EpisodeError;
use crate::generator::TaskInstance;
use crate::task::TaskDefinition;
use crate::trajectory::TrajectoryCollector;

use super::config::RunConfig;
use super::result::{EpisodeOutcome, EpisodeResult};
use super::state::{EpisodeState, TerminationReason};

/// One run of an agent against a borrowed [`TaskInstance`].
///
/// `Pending → Running` on [`reset`](Self::reset); each [`step`](Self::step)
/// either keeps it running or moves it to a terminal state. Once terminal,
/// further steps fail with [`EpisodeError::Closed`] and record nothing.
pub struct Episode<'a> {
    instance: &'a TaskInstance,
    adapter: EnvironmentAdapter,
    config: RunConfig,
    state: EpisodeState,
    termination: Option<TerminationReason>,
    collector: TrajectoryCollector,
    started: Option<Instant>,
    elapsed: Duration,
}

impl<'a> Episode<'a> {
    pub fn new(
        task: Arc<dyn TaskDefinition>,
        instance: &'a TaskInstance,
        config: RunConfig,
        agent: &str,
    ) -> Self {
        Self::with_adapter(EnvironmentAdapter::new(task), instance, config, agent)
    }

    /// Runs against a caller-supplied adapter, e.g. one wrapping an external simulation.
    pub fn with_adapter(
        adapter: EnvironmentAdapter,
        instance: &'a TaskInstance,
        config: RunConfig,
        agent: &str,
    ) -> Self {
        Self {
            instance,
            adapter,
            config,
            state: EpisodeState::Pending,
            termination: None,
            collector: TrajectoryCollector::new(instance, agent, config.step_budget),
            started: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn id(&self) -> Uuid {
        self.collector.id()
    }

    pub fn instance(&self) -> &'a TaskInstance {
        self.instance
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn termination(&self) -> Option<&TerminationReason> {
        self.termination.as_ref()
    }

    pub fn steps(&self) -> u32 {
        self.collector.len() as u32
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn last_observation(&self) -> Option<&Observation> {
        self.collector.last_observation()
    }

    pub fn reset(&mut self) -> Result<Observation, EpisodeError> {
        if self.state != EpisodeState::Pending {
            return Err(EpisodeError::AlreadyStarted { state: self.state });
        }

        self.started = Some(Instant::now());
        self.state = EpisodeState::Running;
        let observation = match self.adapter.reset(self.instance) {
            Ok(observation) => observation,
            Err(e) => {
                self.conclude(TerminationReason::EnvironmentFault(e.to_string()));
                return Err(e.into());
            }
        };
        self.collector.record_initial(observation.clone());

        debug!(
            episode_id = %self.id(),
            task_id = %self.instance.task_id,
            seed = self.instance.seed,
            step_budget = self.config.step_budget,
            "Episode started"
        );

        if self.config.step_budget == 0 {
            self.conclude(TerminationReason::StepBudgetExhausted);
        }
        Ok(observation)
    }

    pub fn step(&mut self, action: Action) -> Result<Transition, EpisodeError> {
        match self.state {
            EpisodeState::Pending => return Err(EpisodeError::NotStarted),
            EpisodeState::Running => {}
            state => return Err(EpisodeError::Closed { state }),
        }

        let transition = match self.adapter.step(&action) {
            Ok(transition) => transition,
            Err(e) => {
                warn!(episode_id = %self.id(), error = %e, "Environment fault");
                self.conclude(TerminationReason::EnvironmentFault(e.to_string()));
                return Err(e.into());
            }
        };
        self.collector.record_step(action, &transition);

        if transition.goal_reached {
            self.conclude(TerminationReason::GoalReached);
        } else if transition.failed {
            self.conclude(TerminationReason::FailurePredicate);
        } else if self.steps() >= self.config.step_budget {
            self.conclude(TerminationReason::StepBudgetExhausted);
        } else if self.wall_clock_exceeded() {
            self.conclude(TerminationReason::WallClockExceeded);
        }

        Ok(transition)
    }

    /// Stops a running or pending episode as `TimedOut`. No-op once terminal.
    pub fn cancel(&mut self) {
        if !self.state.is_terminal() {
            self.conclude(TerminationReason::Cancelled);
        }
    }

    /// Finalizes the trajectory. An episode that is not yet terminal is cancelled first.
    pub fn finish(mut self) -> EpisodeOutcome {
        self.cancel();
        let trajectory = self
            .collector
            .finalize(self.state, self.termination.clone(), self.elapsed);
        let result = EpisodeResult::from_trajectory(&trajectory);
        EpisodeOutcome { result, trajectory }
    }

    fn wall_clock_exceeded(&self) -> bool {
        match (self.config.wall_clock_limit, self.started) {
            (Some(limit), Some(started)) => started.elapsed() >= limit,
            _ => false,
        }
    }

    fn conclude(&mut self, reason: TerminationReason) {
        self.state = reason.terminal_state();
        self.elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        self.adapter.release();

        info!(
            episode_id = %self.id(),
            task_id = %self.instance.task_id,
            seed = self.instance.seed,
            state = %self.state,
            reason = %reason,
            steps = self.steps(),
            "Episode finished"
        );
        self.termination = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::InstanceGenerator;
    use crate::tasks::{PushToTarget, OBJECT, TARGET};

    fn setup(seed: u64) -> (Arc<dyn TaskDefinition>, TaskInstance) {
        let task: Arc<dyn TaskDefinition> = Arc::new(PushToTarget::new());
        let instance = InstanceGenerator::new()
            .generate(task.as_ref(), seed)
            .expect("generation should succeed");
        (task, instance)
    }

    #[test]
    fn test_step_before_reset() {
        let (task, instance) = setup(1);
        let mut episode = Episode::new(task, &instance, RunConfig::new(5), "noop");
        assert!(matches!(episode.step(Action::noop()), Err(EpisodeError::NotStarted)));
        assert_eq!(episode.state(), EpisodeState::Pending);
    }

    #[test]
    fn test_budget_exhaustion_times_out() {
        let (task, instance) = setup(42);
        let mut episode = Episode::new(task, &instance, RunConfig::new(5), "noop");
        episode.reset().expect("reset should succeed");
        for _ in 0..5 {
            episode.step(Action::noop()).expect("step should succeed");
        }
        assert_eq!(episode.state(), EpisodeState::TimedOut);
        assert_eq!(episode.termination(), Some(&TerminationReason::StepBudgetExhausted));

        let err = episode.step(Action::noop()).unwrap_err();
        assert!(matches!(err, EpisodeError::Closed { state: EpisodeState::TimedOut }));
        assert_eq!(episode.steps(), 5);

        let outcome = episode.finish();
        assert_eq!(outcome.trajectory.len(), 5);
        assert_eq!(outcome.result.state(), EpisodeState::TimedOut);
    }

    #[test]
    fn test_goal_reached_succeeds() {
        let (task, instance) = setup(7);
        let mut episode = Episode::new(task, &instance, RunConfig::new(100), "oracle");
        let mut obs = episode.reset().expect("reset should succeed");

        while episode.state() == EpisodeState::Running {
            let object = obs.body(OBJECT).expect("object present").pose.position();
            let target = obs.body(TARGET).expect("target present").pose.position();
            let dx = (target.x - object.x).clamp(-0.05, 0.05);
            obs = episode
                .step(Action::translate(dx, 0.0))
                .expect("step should succeed")
                .observation;
        }
        assert_eq!(episode.state(), EpisodeState::Succeeded);
        let outcome = episode.finish();
        assert!(outcome.result.success());
        assert!(outcome.result.steps() < 100);
    }

    #[test]
    fn test_cancel_and_reset_twice() {
        let (task, instance) = setup(2);
        let mut episode = Episode::new(task, &instance, RunConfig::new(50), "noop");
        episode.reset().expect("reset should succeed");
        assert!(matches!(episode.reset(), Err(EpisodeError::AlreadyStarted { .. })));
        episode.step(Action::noop()).expect("step should succeed");
        episode.cancel();
        assert_eq!(episode.state(), EpisodeState::TimedOut);
        assert_eq!(episode.termination(), Some(&TerminationReason::Cancelled));

        let outcome = episode.finish();
        assert_eq!(outcome.trajectory.len(), 1);
    }

    #[test]
    fn test_environment_fault_fails_episode() {
        let (task, instance) = setup(3);
        let mut episode = Episode::new(task, &instance, RunConfig::new(10), "bad");
        episode.reset().expect("reset should succeed");
        let err = episode.step(Action::new(f64::NAN, 0.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, EpisodeError::Environment(_)));
        assert_eq!(episode.state(), EpisodeState::Failed);
        assert_eq!(episode.termination().map(|r| r.code()), Some("environment_fault"));
        assert_eq!(episode.steps(), 0);
    }
}
