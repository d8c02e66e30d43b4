//! Trajectory data types for episode recording.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::env::{Action, Observation, StepInfo};
use crate::runner::{EpisodeState, TerminationReason};

/// One recorded step: the raw agent action and what followed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryStep {
    /// Zero-based step index.
    pub index: u32,
    /// Action as returned by the agent, before clipping.
    pub action: Action,
    /// Observation after the action.
    pub observation: Observation,
    pub reward: f64,
    pub cost: f64,
    pub done: bool,
    #[serde(default)]
    pub info: StepInfo,
}

/// A finalized episode recording.
///
/// Built by [`super::TrajectoryCollector`]; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    id: Uuid,
    task_id: String,
    seed: u64,
    fingerprint: String,
    agent: String,
    step_budget: u32,
    initial_observation: Option<Observation>,
    steps: Vec<TrajectoryStep>,
    outcome: EpisodeState,
    termination: Option<TerminationReason>,
    created_at: DateTime<Utc>,
    duration_ms: u64,
}

impl Trajectory {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: Uuid,
        task_id: String,
        seed: u64,
        fingerprint: String,
        agent: String,
        step_budget: u32,
        initial_observation: Option<Observation>,
        steps: Vec<TrajectoryStep>,
        outcome: EpisodeState,
        termination: Option<TerminationReason>,
        created_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id,
            task_id,
            seed,
            fingerprint,
            agent,
            step_budget,
            initial_observation,
            steps,
            outcome,
            termination,
            created_at,
            duration_ms,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fingerprint of the instance this episode ran on.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn step_budget(&self) -> u32 {
        self.step_budget
    }

    pub fn initial_observation(&self) -> Option<&Observation> {
        self.initial_observation.as_ref()
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

    pub fn outcome(&self) -> EpisodeState {
        self.outcome
    }

    pub fn termination(&self) -> Option<&TerminationReason> {
        self.termination.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|s| s.reward).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.steps.iter().map(|s| s.cost).sum()
    }

    /// Number of steps whose move was rejected for collision.
    pub fn collision_count(&self) -> usize {
        self.steps.iter().filter(|s| s.info.collision).count()
    }

    pub fn last_observation(&self) -> Option<&Observation> {
        self.steps
            .last()
            .map(|s| &s.observation)
            .or(self.initial_observation.as_ref())
    }
}
