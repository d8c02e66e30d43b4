//! Store thin blocks on a shelf in a cluttered room.
//!
//! Half the blocks (rounded down) start on the shelf; the rest are scattered
//! below it at poses rejection-sampled from the `layout_seed` parameter.

use std::f64::consts::PI;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::difficulty::DifficultyTier;
use crate::env::Observation;
use crate::error::GeneratorError;
use crate::geom2d::{
    intersects, is_inside, Body, BodyKind, RobotState, SE2Pose, Shape, WorldBounds, WorldState, GEOM_EPS,
};
use crate::task::{Distribution, ParameterAssignment, TaskDefinition, TaskSpec};

use super::robot_pose;

const WORLD_WIDTH: f64 = 5.0;
const WORLD_HEIGHT: f64 = 3.0;
const ROBOT_RADIUS: f64 = 0.2;
const SHELF_HEIGHT: f64 = WORLD_HEIGHT / 8.0;
const SHELF_PAD: f64 = SHELF_HEIGHT / 10.0;
const SHELF_Y: f64 = WORLD_HEIGHT - SHELF_HEIGHT;
const BLOCK_WIDTH: f64 = 0.28;
const BLOCK_HEIGHT: f64 = 0.04;
const MAX_SAMPLING_ATTEMPTS: usize = 10_000;

/// Placement region for the robot and the loose blocks.
const FLOOR_MIN_X: f64 = 4.0 * ROBOT_RADIUS;
const FLOOR_MAX_X: f64 = WORLD_WIDTH - 4.0 * ROBOT_RADIUS;
const FLOOR_MIN_Y: f64 = 4.0 * ROBOT_RADIUS;
const FLOOR_MAX_Y: f64 = SHELF_Y - 4.0 * ROBOT_RADIUS;

pub const SHELF: &str = "shelf";

pub struct Storage2D {
    spec: TaskSpec,
    num_blocks: usize,
}

impl Storage2D {
    /// Creates the `storage2d-b{n}` variant.
    pub fn new(num_blocks: usize) -> Self {
        let tier = if num_blocks <= 1 {
            DifficultyTier::Medium
        } else {
            DifficultyTier::Hard
        };
        let budget = if num_blocks <= 1 { 500 } else { 1000 };
        let shelf_blocks = num_blocks / 2;

        let mut spec = TaskSpec::new(format!("storage2d-b{}", num_blocks), tier)
            .with_description(format!(
                "Grasp {} block(s) with the vacuum and store all of them on the shelf",
                num_blocks
            ))
            .with_goal("every block lies fully inside the shelf")
            .with_tag("storage")
            .with_tag("grasping")
            .with_parameter("robot_x", Distribution::uniform(FLOOR_MIN_X, FLOOR_MAX_X))
            .with_parameter("robot_y", Distribution::uniform(FLOOR_MIN_Y, FLOOR_MAX_Y))
            .with_parameter("robot_theta", Distribution::uniform(-PI, PI))
            .with_parameter(
                "shelf_x",
                Distribution::uniform(0.0, WORLD_WIDTH - shelf_width(shelf_blocks)),
            )
            .with_step_budget(budget);
        for i in 0..shelf_blocks {
            spec = spec.with_parameter(
                format!("shelf_block_{}_theta", i),
                Distribution::uniform(-PI / 16.0, PI / 16.0),
            );
        }
        spec = spec.with_parameter("layout_seed", Distribution::uniform_int(0, i64::from(u32::MAX)));
        Self { spec, num_blocks }
    }

    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    pub(crate) fn spec_mut(&mut self) -> &mut TaskSpec {
        &mut self.spec
    }

    fn shelf_blocks(&self) -> usize {
        self.num_blocks / 2
    }
}

fn shelf_width(shelf_blocks: usize) -> f64 {
    (BLOCK_WIDTH + SHELF_PAD) * shelf_blocks.max(1) as f64
}

fn block_shape() -> Shape {
    Shape::rectangle(BLOCK_WIDTH, BLOCK_HEIGHT)
}

impl TaskDefinition for Storage2D {
    fn spec(&self) -> &TaskSpec {
        &self.spec
    }

    fn build_initial_state(&self, parameters: &ParameterAssignment) -> Result<WorldState, GeneratorError> {
        let shelf_blocks = self.shelf_blocks();
        let width = shelf_width(shelf_blocks);
        let shelf_x = parameters.get_f64("shelf_x")?;
        if shelf_x < 0.0 || shelf_x + width > WORLD_WIDTH + GEOM_EPS {
            return Err(GeneratorError::invalid("shelf_x", "shelf does not fit in the world"));
        }

        let mut world = WorldState::new(
            WorldBounds::new(0.0, WORLD_WIDTH, 0.0, WORLD_HEIGHT),
            RobotState::new(robot_pose(parameters)?, ROBOT_RADIUS),
        )
        .with_body(Body::new(
            SHELF,
            BodyKind::Shelf,
            Shape::rectangle(width, SHELF_HEIGHT),
            SE2Pose::new(shelf_x + width / 2.0, SHELF_Y + SHELF_HEIGHT / 2.0, 0.0),
        ));

        // Bookends fill the shelf band on either side.
        let right_x = shelf_x + width;
        for (name, left, right) in [
            ("shelf_left_bookend", 0.0, shelf_x),
            ("shelf_right_bookend", right_x, WORLD_WIDTH),
        ] {
            if right - left > GEOM_EPS {
                world.bodies.push(Body::new(
                    name,
                    BodyKind::Obstacle,
                    Shape::rectangle(right - left, SHELF_HEIGHT),
                    SE2Pose::new((left + right) / 2.0, SHELF_Y + SHELF_HEIGHT / 2.0, 0.0),
                ));
            }
        }

        let half_slot = (SHELF_PAD + BLOCK_WIDTH) / 2.0;
        let (min_x, max_x) = (shelf_x + half_slot, shelf_x + width - half_slot);
        for i in 0..shelf_blocks {
            let x = if shelf_blocks == 1 {
                min_x
            } else {
                min_x + (max_x - min_x) * i as f64 / (shelf_blocks - 1) as f64
            };
            let theta = parameters.get_f64(&format!("shelf_block_{}_theta", i))?;
            world.bodies.push(Body::new(
                format!("block{}", i),
                BodyKind::Movable,
                block_shape(),
                SE2Pose::new(x, SHELF_Y + 2.0 * BLOCK_HEIGHT, theta),
            ));
        }

        let layout_seed = parameters.get_i64("layout_seed")?;
        let mut rng = ChaCha8Rng::seed_from_u64(layout_seed as u64);
        let robot_shape = world.robot.shape();
        for i in shelf_blocks..self.num_blocks {
            let mut placed = None;
            for _ in 0..MAX_SAMPLING_ATTEMPTS {
                let candidate = Body::new(
                    format!("block{}", i),
                    BodyKind::Movable,
                    block_shape(),
                    SE2Pose::new(
                        rng.random_range(FLOOR_MIN_X..=FLOOR_MAX_X),
                        rng.random_range(FLOOR_MIN_Y..=FLOOR_MAX_Y),
                        rng.random_range(-PI..=PI),
                    ),
                );
                let hits_robot = intersects(&world.robot.pose, &robot_shape, &candidate.pose, &candidate.shape);
                let hits_body = world
                    .bodies
                    .iter()
                    .any(|b| b.kind.is_solid() && b.overlaps(&candidate));
                if !hits_robot && !hits_body && world.bounds.contains_shape(&candidate.pose, &candidate.shape) {
                    placed = Some(candidate);
                    break;
                }
            }
            let block = placed.ok_or_else(|| {
                GeneratorError::invalid(
                    "layout_seed",
                    format!("no collision-free pose for block{} after {} attempts", i, MAX_SAMPLING_ATTEMPTS),
                )
            })?;
            world.bodies.push(block);
        }
        Ok(world)
    }

    fn goal_satisfied(&self, observation: &Observation) -> bool {
        let Some(shelf) = observation.body(SHELF) else {
            return false;
        };
        observation
            .world
            .bodies_of_kind(BodyKind::Movable)
            .all(|block| is_inside(&block.pose, &block.shape, &shelf.pose, &shelf.shape))
    }
}
