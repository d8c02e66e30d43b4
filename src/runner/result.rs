//! Episode results derived from trajectories.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::trajectory::Trajectory;

use super::state::{EpisodeState, TerminationReason};

/// Immutable summary of one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    episode_id: Uuid,
    task_id: String,
    seed: u64,
    agent: String,
    state: EpisodeState,
    termination: Option<TerminationReason>,
    steps: u32,
    step_budget: u32,
    total_reward: f64,
    total_cost: f64,
    collisions: u32,
    duration_ms: u64,
}

impl EpisodeResult {
    pub fn from_trajectory(trajectory: &Trajectory) -> Self {
        Self {
            episode_id: trajectory.id(),
            task_id: trajectory.task_id().to_string(),
            seed: trajectory.seed(),
            agent: trajectory.agent().to_string(),
            state: trajectory.outcome(),
            termination: trajectory.termination().cloned(),
            steps: trajectory.len() as u32,
            step_budget: trajectory.step_budget(),
            total_reward: trajectory.total_reward(),
            total_cost: trajectory.total_cost(),
            collisions: trajectory.collision_count() as u32,
            duration_ms: trajectory.duration_ms(),
        }
    }

    /// Result for an episode whose trajectory was lost, e.g. a crashed worker.
    pub fn aborted(
        task_id: impl Into<String>,
        seed: u64,
        agent: impl Into<String>,
        step_budget: u32,
        reason: TerminationReason,
    ) -> Self {
        Self {
            episode_id: Uuid::new_v4(),
            task_id: task_id.into(),
            seed,
            agent: agent.into(),
            state: reason.terminal_state(),
            termination: Some(reason),
            steps: 0,
            step_budget,
            total_reward: 0.0,
            total_cost: 0.0,
            collisions: 0,
            duration_ms: 0,
        }
    }

    pub fn episode_id(&self) -> Uuid {
        self.episode_id
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn termination(&self) -> Option<&TerminationReason> {
        self.termination.as_ref()
    }

    pub fn success(&self) -> bool {
        self.state == EpisodeState::Succeeded
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn step_budget(&self) -> u32 {
        self.step_budget
    }

    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// What a finished episode hands back: its result and full recording.
#[derive(Debug, Clone)]
pub struct EpisodeOutcome {
    pub result: EpisodeResult,
    pub trajectory: Trajectory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_result() {
        let result = EpisodeResult::aborted(
            "push-to-target",
            7,
            "random",
            100,
            TerminationReason::WorkerCrashed("panic".into()),
        );
        assert_eq!(result.state(), EpisodeState::Failed);
        assert!(!result.success());
        assert_eq!(result.steps(), 0);
        assert_eq!(result.termination().map(|r| r.code()), Some("worker_crashed"));
    }
}
