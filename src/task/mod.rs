//! Task definitions.
//!
//! A task declares its parameter distributions in a [`TaskSpec`], builds the
//! initial world for a parameter assignment, and judges observations with
//! pure goal and failure predicates.

mod distribution;
mod spec;

use crate::env::{Observation, Simulation, StepInfo};
use crate::error::GeneratorError;
use crate::generator::ParameterSampler;
use crate::geom2d::{KinematicSimulator, WorldState};

pub use distribution::{Distribution, ParamValue, ParameterAssignment};
pub use spec::{is_valid_task_id, ParameterSpec, TaskSpec};

/// Reward charged for every step.
pub const DEFAULT_STEP_REWARD: f64 = -1.0;

/// A parameterized family of physical-reasoning problems.
///
/// Implementations must be pure: sampling depends only on the seed and
/// predicates only on the observation.
pub trait TaskDefinition: Send + Sync {
    fn spec(&self) -> &TaskSpec;

    /// Samples parameters in declaration order from a generator seeded with `seed`.
    fn sample_parameters(&self, seed: u64) -> Result<ParameterAssignment, GeneratorError> {
        ParameterSampler::new(seed).sample(&self.spec().parameters)
    }

    /// Lays out the world for a parameter assignment.
    fn build_initial_state(&self, parameters: &ParameterAssignment) -> Result<WorldState, GeneratorError>;

    fn goal_satisfied(&self, observation: &Observation) -> bool;

    fn is_failure(&self, _observation: &Observation) -> bool {
        false
    }

    fn step_reward(&self, _observation: &Observation, _info: &StepInfo) -> f64 {
        DEFAULT_STEP_REWARD
    }

    /// Safety cost of one step; a rejected colliding move costs 1.
    fn safety_cost(&self, _observation: &Observation, info: &StepInfo) -> f64 {
        if info.collision {
            1.0
        } else {
            0.0
        }
    }

    fn create_simulation(&self) -> Box<dyn Simulation> {
        Box::new(KinematicSimulator::new(self.spec().action_space))
    }
}
