//! The simulation capability consumed by the environment adapter.

use serde::{Deserialize, Serialize};

use crate::error::EnvironmentError;
use crate::geom2d::WorldState;

use super::action::Action;

/// Events produced by one simulation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// The commanded move was rejected because it would collide or leave the world.
    pub collision: bool,
    /// Body picked up by the vacuum during this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grasped: Option<String>,
    /// Body dropped during this step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    /// Bodies displaced by contact with the robot.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pushed: Vec<String>,
}

/// A deterministic world simulation.
///
/// Implementations own their state for the duration of an episode. Given the
/// same initial state and action sequence they must produce the same states.
pub trait Simulation: Send {
    /// Replaces the internal state and returns it.
    fn reset(&mut self, initial: &WorldState) -> Result<WorldState, EnvironmentError>;

    /// Advances one step.
    fn step(&mut self, action: &Action) -> Result<(WorldState, StepInfo), EnvironmentError>;

    /// Returns the current state without advancing.
    fn observe(&self) -> Result<WorldState, EnvironmentError>;

    /// Drops the internal state. Later calls fail until the next reset.
    fn release(&mut self);
}
