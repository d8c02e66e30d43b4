//! Trajectory collector for recording episodes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::env::{Action, Observation, Transition};
use crate::generator::TaskInstance;
use crate::runner::{EpisodeState, TerminationReason};

use super::types::{Trajectory, TrajectoryStep};

/// Accumulates steps while an episode runs.
///
/// # Usage Pattern
///
/// 1. Call `record_initial()` with the reset observation
/// 2. Call `record_step()` after every adapter step
/// 3. Call `finalize()` once the episode is terminal
pub struct TrajectoryCollector {
    id: Uuid,
    task_id: String,
    seed: u64,
    fingerprint: String,
    agent: String,
    step_budget: u32,
    created_at: DateTime<Utc>,
    initial: Option<Observation>,
    steps: Vec<TrajectoryStep>,
}

impl TrajectoryCollector {
    pub fn new(instance: &TaskInstance, agent: &str, step_budget: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id: instance.task_id.clone(),
            seed: instance.seed,
            fingerprint: instance.fingerprint.clone(),
            agent: agent.to_string(),
            step_budget,
            created_at: Utc::now(),
            initial: None,
            steps: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn record_initial(&mut self, observation: Observation) {
        self.initial = Some(observation);
    }

    /// Appends one step. `action` is the raw agent action.
    pub fn record_step(&mut self, action: Action, transition: &Transition) {
        self.steps.push(TrajectoryStep {
            index: self.steps.len() as u32,
            action,
            observation: transition.observation.clone(),
            reward: transition.reward,
            cost: transition.safety_cost,
            done: transition.done,
            info: transition.info.clone(),
        });
    }

    pub fn steps(&self) -> &[TrajectoryStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn last_observation(&self) -> Option<&Observation> {
        self.steps.last().map(|s| &s.observation).or(self.initial.as_ref())
    }

    pub fn finalize(
        self,
        outcome: EpisodeState,
        termination: Option<TerminationReason>,
        duration: Duration,
    ) -> Trajectory {
        Trajectory::new(
            self.id,
            self.task_id,
            self.seed,
            self.fingerprint,
            self.agent,
            self.step_budget,
            self.initial,
            self.steps,
            outcome,
            termination,
            self.created_at,
            duration.as_millis() as u64,
        )
    }
}
