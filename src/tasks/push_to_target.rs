//! Push a round object into a target region.

use crate::difficulty::DifficultyTier;
use crate::env::Observation;
use crate::error::GeneratorError;
use crate::geom2d::{Body, BodyKind, RobotState, SE2Pose, Shape, WorldBounds, WorldState};
use crate::task::{Distribution, ParameterAssignment, TaskDefinition, TaskSpec};

pub const PUSH_TO_TARGET_ID: &str = "push-to-target";

const WORLD_SIZE: f64 = 2.5;
const ROBOT_RADIUS: f64 = 0.1;
const OBJECT_RADIUS: f64 = 0.08;
/// How far past the target along +x the object may travel before the episode fails.
pub const OVERSHOOT_LIMIT: f64 = 0.3;

pub const OBJECT: &str = "object";
pub const TARGET: &str = "target";

/// The robot starts behind a puck; the target lies `distance` further along +x.
pub struct PushToTarget {
    spec: TaskSpec,
}

impl Default for PushToTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl PushToTarget {
    pub fn new() -> Self {
        let spec = TaskSpec::new(PUSH_TO_TARGET_ID, DifficultyTier::Easy)
            .with_description("Push a round object along +x into a circular target region")
            .with_goal("object center lies within target_tolerance of the target center")
            .with_tag("push")
            .with_tag("contact")
            .with_parameter("distance", Distribution::uniform(0.1, 1.0))
            .with_parameter("start_x", Distribution::uniform(0.3, 0.6))
            .with_parameter("start_y", Distribution::uniform(0.5, 2.0))
            .with_parameter("target_tolerance", Distribution::fixed(0.05))
            .with_step_budget(100);
        Self { spec }
    }

    pub(crate) fn spec_mut(&mut self) -> &mut TaskSpec {
        &mut self.spec
    }
}

impl TaskDefinition for PushToTarget {
    fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    fn build_initial_state(&self, parameters: &ParameterAssignment) -> Result<WorldState, GeneratorError> {
        let distance = parameters.get_f64("distance")?;
        let start_x = parameters.get_f64("start_x")?;
        let start_y = parameters.get_f64("start_y")?;
        let tolerance = parameters.get_f64("target_tolerance")?;
        if tolerance <= 0.0 {
            return Err(GeneratorError::invalid("target_tolerance", "must be positive"));
        }

        let object_x = start_x + ROBOT_RADIUS + OBJECT_RADIUS;
        let target_x = object_x + distance;
        if target_x + OVERSHOOT_LIMIT + OBJECT_RADIUS > WORLD_SIZE {
            return Err(GeneratorError::invalid(
                "distance",
                format!("target at x={:.3} leaves no room to overshoot", target_x),
            ));
        }

        Ok(WorldState::new(
            WorldBounds::new(0.0, WORLD_SIZE, 0.0, WORLD_SIZE),
            RobotState::new(SE2Pose::new(start_x, start_y, 0.0), ROBOT_RADIUS),
        )
        .with_body(Body::new(
            OBJECT,
            BodyKind::Movable,
            Shape::circle(OBJECT_RADIUS),
            SE2Pose::new(object_x, start_y, 0.0),
        ))
        .with_body(Body::new(
            TARGET,
            BodyKind::TargetRegion,
            Shape::circle(tolerance),
            SE2Pose::new(target_x, start_y, 0.0),
        )))
    }

    fn goal_satisfied(&self, observation: &Observation) -> bool {
        match (observation.body(OBJECT), observation.body(TARGET)) {
            (Some(object), Some(target)) => target.shape.contains_point(&target.pose, object.pose.position()),
            _ => false,
        }
    }

    fn is_failure(&self, observation: &Observation) -> bool {
        match (observation.body(OBJECT), observation.body(TARGET)) {
            (Some(object), Some(target)) => object.pose.x > target.pose.x + OVERSHOOT_LIMIT,
            _ => false,
        }
    }
}
