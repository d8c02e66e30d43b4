//! Navigate a circular robot through narrow wall passages to a target region.

use std::f64::consts::PI;

use crate::difficulty::DifficultyTier;
use crate::env::Observation;
use crate::error::GeneratorError;
use crate::geom2d::{Body, BodyKind, RobotState, SE2Pose, Shape, WorldBounds, WorldState};
use crate::task::{Distribution, ParameterAssignment, TaskDefinition, TaskSpec};

use super::robot_pose;

const WORLD_SIZE: f64 = 2.5;
const ROBOT_RADIUS: f64 = 0.1;
const TARGET_SIZE: f64 = 2.5 * ROBOT_RADIUS;
const OBSTACLE_WIDTH: f64 = ROBOT_RADIUS / 10.0;
/// Left edge of the first wall and right edge of the last wall.
const OBSTACLE_MIN_X: f64 = 0.5;
const OBSTACLE_MAX_X: f64 = 1.99;

pub const TARGET_REGION: &str = "target_region";

pub struct Motion2D {
    spec: TaskSpec,
    num_passages: usize,
}

impl Motion2D {
    /// Creates the `motion2d-p{n}` variant.
    pub fn new(num_passages: usize) -> Self {
        let tier = match num_passages {
            0 | 1 => DifficultyTier::Easy,
            2 => DifficultyTier::Medium,
            _ => DifficultyTier::Hard,
        };
        let mut spec = TaskSpec::new(format!("motion2d-p{}", num_passages), tier)
            .with_description(format!(
                "Drive the robot through {} vertical wall(s), each with one narrow passage",
                num_passages
            ))
            .with_goal("robot center lies inside the target region")
            .with_tag("motion")
            .with_tag("navigation")
            .with_parameter("robot_x", Distribution::uniform(2.5 * ROBOT_RADIUS, 3.0 * ROBOT_RADIUS))
            .with_parameter(
                "robot_y",
                Distribution::uniform(3.0 * ROBOT_RADIUS, WORLD_SIZE - 3.0 * ROBOT_RADIUS),
            )
            .with_parameter("robot_theta", Distribution::uniform(-PI, PI))
            .with_parameter(
                "target_x",
                Distribution::uniform(
                    WORLD_SIZE - 3.0 * ROBOT_RADIUS + TARGET_SIZE / 2.0,
                    WORLD_SIZE - 2.5 * ROBOT_RADIUS + TARGET_SIZE / 2.0,
                ),
            )
            .with_parameter(
                "target_y",
                Distribution::uniform(
                    3.0 * ROBOT_RADIUS + TARGET_SIZE / 2.0,
                    WORLD_SIZE - 3.0 * ROBOT_RADIUS + TARGET_SIZE / 2.0,
                ),
            )
            .with_step_budget(100 + 100 * num_passages as u32);
        for i in 0..num_passages {
            spec = spec
                .with_parameter(
                    format!("passage_{}_y", i),
                    Distribution::uniform(2.0 * ROBOT_RADIUS, WORLD_SIZE - 2.0 * ROBOT_RADIUS),
                )
                .with_parameter(
                    format!("passage_{}_height", i),
                    Distribution::uniform(2.5 * ROBOT_RADIUS, 4.0 * ROBOT_RADIUS),
                );
        }
        Self { spec, num_passages }
    }

    pub fn num_passages(&self) -> usize {
        self.num_passages
    }

    pub(crate) fn spec_mut(&mut self) -> &mut TaskSpec {
        &mut self.spec
    }

    /// Left edge of wall `i`.
    fn wall_x(&self, i: usize) -> f64 {
        if self.num_passages <= 1 {
            return OBSTACLE_MIN_X;
        }
        let n = self.num_passages as f64;
        let gap = (OBSTACLE_MAX_X - OBSTACLE_MIN_X - n * OBSTACLE_WIDTH) / (n - 1.0);
        OBSTACLE_MIN_X + i as f64 * (OBSTACLE_WIDTH + gap)
    }
}

impl TaskDefinition for Motion2D {
    fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    fn build_initial_state(&self, parameters: &ParameterAssignment) -> Result<WorldState, GeneratorError> {
        let mut world = WorldState::new(
            WorldBounds::new(0.0, WORLD_SIZE, 0.0, WORLD_SIZE),
            RobotState::new(robot_pose(parameters)?, ROBOT_RADIUS),
        )
        .with_body(Body::new(
            TARGET_REGION,
            BodyKind::TargetRegion,
            Shape::rectangle(TARGET_SIZE, TARGET_SIZE),
            SE2Pose::new(parameters.get_f64("target_x")?, parameters.get_f64("target_y")?, 0.0),
        ));

        let mut count = 0;
        for i in 0..self.num_passages {
            let passage_y = parameters.get_f64(&format!("passage_{}_y", i))?;
            let passage_height = parameters.get_f64(&format!("passage_{}_height", i))?;
            if passage_height <= 2.0 * ROBOT_RADIUS {
                return Err(GeneratorError::invalid(
                    format!("passage_{}_height", i),
                    "passage is narrower than the robot",
                ));
            }
            let center_x = self.wall_x(i) + OBSTACLE_WIDTH / 2.0;

            // Wall segments below and above the passage; either may vanish at the world edge.
            let top_y = passage_y + passage_height;
            for (bottom, top) in [(0.0, passage_y), (top_y, WORLD_SIZE)] {
                let height = top - bottom;
                if height <= 0.0 {
                    continue;
                }
                world.bodies.push(Body::new(
                    format!("obstacle{}", count),
                    BodyKind::Obstacle,
                    Shape::rectangle(OBSTACLE_WIDTH, height),
                    SE2Pose::new(center_x, bottom + height / 2.0, 0.0),
                ));
                count += 1;
            }
        }
        Ok(world)
    }

    fn goal_satisfied(&self, observation: &Observation) -> bool {
        observation
            .body(TARGET_REGION)
            .map(|region| {
                region
                    .shape
                    .contains_point(&region.pose, observation.robot().pose.position())
            })
            .unwrap_or(false)
    }
}
