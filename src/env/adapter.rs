//! Environment adapter: a task's predicates wrapped around a simulation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::EnvironmentError;
use crate::generator::TaskInstance;
use crate::task::TaskDefinition;

use super::action::Action;
use super::observation::Observation;
use super::simulation::{Simulation, StepInfo};

/// Result of one adapter step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f64,
    pub safety_cost: f64,
    pub done: bool,
    pub goal_reached: bool,
    pub failed: bool,
    pub info: StepInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Active,
    Done,
}

/// Fixed reset/step/observe contract over a [`Simulation`].
///
/// The adapter never mutates the instance it was reset with; all episode
/// state lives in the simulation.
pub struct EnvironmentAdapter {
    task: Arc<dyn TaskDefinition>,
    simulation: Box<dyn Simulation>,
    phase: Phase,
    steps: u32,
    last: Option<Observation>,
}

impl EnvironmentAdapter {
    /// Creates an adapter using the task's own simulation.
    pub fn new(task: Arc<dyn TaskDefinition>) -> Self {
        let simulation = task.create_simulation();
        Self::with_simulation(task, simulation)
    }

    pub fn with_simulation(task: Arc<dyn TaskDefinition>, simulation: Box<dyn Simulation>) -> Self {
        Self {
            task,
            simulation,
            phase: Phase::Idle,
            steps: 0,
            last: None,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task.spec().id
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn reset(&mut self, instance: &TaskInstance) -> Result<Observation, EnvironmentError> {
        if instance.task_id != self.task.spec().id {
            return Err(EnvironmentError::TaskMismatch {
                expected: self.task.spec().id.clone(),
                found: instance.task_id.clone(),
            });
        }

        let world = self.simulation.reset(&instance.initial_state)?;
        let observation = Observation::new(0, world);
        self.phase = Phase::Active;
        self.steps = 0;
        self.last = Some(observation.clone());

        debug!(task_id = %instance.task_id, seed = instance.seed, "Environment reset");
        Ok(observation)
    }

    pub fn step(&mut self, action: &Action) -> Result<Transition, EnvironmentError> {
        match self.phase {
            Phase::Idle => return Err(EnvironmentError::NotReset),
            Phase::Done => return Err(EnvironmentError::EpisodeDone),
            Phase::Active => {}
        }
        if !action.is_finite() {
            return Err(EnvironmentError::InvalidAction(format!(
                "non-finite component in {:?}",
                action
            )));
        }

        let (world, info) = self.simulation.step(action)?;
        self.steps += 1;
        let observation = Observation::new(self.steps, world);

        let goal_reached = self.task.goal_satisfied(&observation);
        let failed = !goal_reached && self.task.is_failure(&observation);
        let done = goal_reached || failed;
        let reward = self.task.step_reward(&observation, &info);
        let safety_cost = self.task.safety_cost(&observation, &info);

        if done {
            self.phase = Phase::Done;
        }
        trace!(
            step = self.steps,
            collision = info.collision,
            done = done,
            "Environment step"
        );

        self.last = Some(observation.clone());
        Ok(Transition {
            observation,
            reward,
            safety_cost,
            done,
            goal_reached,
            failed,
            info,
        })
    }

    pub fn observe(&self) -> Result<Observation, EnvironmentError> {
        match (&self.phase, &self.last) {
            (Phase::Idle, _) | (_, None) => Err(EnvironmentError::NotReset),
            (_, Some(observation)) => Ok(observation.clone()),
        }
    }

    /// Drops the simulation state. The adapter must be reset before reuse.
    pub fn release(&mut self) {
        self.simulation.release();
        self.phase = Phase::Idle;
        self.last = None;
    }
}
