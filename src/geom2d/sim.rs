//! Kinematic reference simulation.
//!
//! Resolves poses and overlaps only: there are no velocities, masses or
//! contact forces. A commanded move is either applied in full or rejected.

use glam::DVec2;
use tracing::trace;

use crate::env::{Action, ActionSpace, Simulation, StepInfo};
use crate::error::EnvironmentError;

use super::pose::SE2Pose;
use super::shapes::{circle_clearance, intersects, Shape};
use super::world::{BodyKind, Grasp, WorldState};

/// Default distance between the robot rim and a body within which the vacuum grips.
pub const DEFAULT_GRASP_MARGIN: f64 = 0.05;

pub struct KinematicSimulator {
    action_space: ActionSpace,
    grasp_margin: f64,
    state: Option<WorldState>,
}

impl KinematicSimulator {
    pub fn new(action_space: ActionSpace) -> Self {
        Self {
            action_space,
            grasp_margin: DEFAULT_GRASP_MARGIN,
            state: None,
        }
    }

    pub fn with_grasp_margin(mut self, margin: f64) -> Self {
        self.grasp_margin = margin;
        self
    }

    /// Computes the world after moving the robot, or `None` if the move is blocked.
    fn propose_move(&self, world: &WorldState, action: &Action, info: &mut StepInfo) -> Option<WorldState> {
        let robot = &world.robot;
        let robot_shape = robot.shape();
        let new_pose = SE2Pose::new(
            robot.pose.x + action.dx,
            robot.pose.y + action.dy,
            robot.pose.theta + action.dtheta,
        );
        let motion = DVec2::new(action.dx, action.dy);

        let mut next = world.clone();
        next.robot.pose = new_pose;
        let held = robot.held.as_ref().map(|g| g.body.clone());
        let mut moved: Vec<usize> = Vec::new();

        if let Some(grasp) = &robot.held {
            let idx = next.bodies.iter().position(|b| b.name == grasp.body)?;
            next.bodies[idx].pose = new_pose.compose(&grasp.offset);
            moved.push(idx);
        }

        for idx in 0..next.bodies.len() {
            let body = &next.bodies[idx];
            if body.kind != BodyKind::Movable || held.as_deref() == Some(body.name.as_str()) {
                continue;
            }
            if !intersects(&new_pose, &robot_shape, &body.pose, &body.shape) {
                continue;
            }
            let Shape::Circle { radius } = body.shape else {
                // Only round bodies slide away from the base.
                return None;
            };
            let mut direction = (body.pose.position() - new_pose.position()).normalize_or_zero();
            if direction == DVec2::ZERO {
                direction = motion.normalize_or_zero();
            }
            if direction == DVec2::ZERO {
                return None;
            }
            let center = new_pose.position() + direction * (robot.base_radius + radius);
            let pushed = SE2Pose::from_position(center, body.pose.theta);
            info.pushed.push(body.name.clone());
            next.bodies[idx].pose = pushed;
            moved.push(idx);
        }

        if !next.bounds.contains_shape(&new_pose, &robot_shape) {
            return None;
        }
        for (idx, body) in next.bodies.iter().enumerate() {
            if !body.kind.is_solid() || moved.contains(&idx) {
                continue;
            }
            if intersects(&new_pose, &robot_shape, &body.pose, &body.shape) {
                return None;
            }
        }

        for &idx in &moved {
            let body = &next.bodies[idx];
            if !next.bounds.contains_shape(&body.pose, &body.shape) {
                return None;
            }
            for (other_idx, other) in next.bodies.iter().enumerate() {
                if other_idx != idx && other.kind.is_solid() && body.overlaps(other) {
                    return None;
                }
            }
        }

        Some(next)
    }

    fn apply_vacuum(&self, world: &mut WorldState, on: bool, info: &mut StepInfo) {
        world.robot.vacuum = on;
        if !on {
            if let Some(grasp) = world.robot.held.take() {
                info.released = Some(grasp.body);
            }
            return;
        }
        if world.robot.held.is_some() {
            return;
        }

        let center = world.robot.pose.position();
        let radius = world.robot.base_radius;
        let nearest = world
            .bodies_of_kind(BodyKind::Movable)
            .map(|b| (circle_clearance(center, radius, &b.pose, &b.shape), b))
            .filter(|(gap, _)| *gap <= self.grasp_margin)
            .min_by(|a, b| a.0.total_cmp(&b.0));

        if let Some((_, body)) = nearest {
            let grasp = Grasp {
                body: body.name.clone(),
                offset: world.robot.pose.relative(&body.pose),
            };
            info.grasped = Some(grasp.body.clone());
            world.robot.held = Some(grasp);
        }
    }
}

impl Simulation for KinematicSimulator {
    fn reset(&mut self, initial: &WorldState) -> Result<WorldState, EnvironmentError> {
        initial.validate().map_err(EnvironmentError::Simulation)?;
        self.state = Some(initial.clone());
        Ok(initial.clone())
    }

    fn step(&mut self, action: &Action) -> Result<(WorldState, StepInfo), EnvironmentError> {
        let current = self.state.as_ref().ok_or(EnvironmentError::NotReset)?;
        let action = self.action_space.clip(action);
        let mut info = StepInfo::default();

        let mut next = match self.propose_move(current, &action, &mut info) {
            Some(next) => next,
            None => {
                info.collision = true;
                info.pushed.clear();
                current.clone()
            }
        };
        self.apply_vacuum(&mut next, action.vacuum_on(), &mut info);

        trace!(
            x = next.robot.pose.x,
            y = next.robot.pose.y,
            collision = info.collision,
            "Kinematic step"
        );
        self.state = Some(next.clone());
        Ok((next, info))
    }

    fn observe(&self) -> Result<WorldState, EnvironmentError> {
        self.state.clone().ok_or(EnvironmentError::NotReset)
    }

    fn release(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2d::{Body, RobotState, WorldBounds};

    fn world() -> WorldState {
        WorldState::new(
            WorldBounds::new(0.0, 2.0, 0.0, 2.0),
            RobotState::new(SE2Pose::new(0.5, 1.0, 0.0), 0.1),
        )
        .with_body(Body::new(
            "wall",
            BodyKind::Obstacle,
            Shape::rectangle(0.02, 2.0),
            SE2Pose::new(1.5, 1.0, 0.0),
        ))
        .with_body(Body::new(
            "puck",
            BodyKind::Movable,
            Shape::circle(0.05),
            SE2Pose::new(0.65, 1.0, 0.0),
        ))
        .with_body(Body::new(
            "block",
            BodyKind::Movable,
            Shape::rectangle(0.2, 0.05),
            SE2Pose::new(0.5, 0.8, 0.0),
        ))
    }

    fn sim() -> KinematicSimulator {
        let mut sim = KinematicSimulator::new(ActionSpace::default());
        sim.reset(&world()).expect("reset should succeed");
        sim
    }

    #[test]
    fn test_step_before_reset() {
        let mut sim = KinematicSimulator::new(ActionSpace::default());
        assert_eq!(sim.step(&Action::noop()).unwrap_err(), EnvironmentError::NotReset);
    }

    #[test]
    fn test_action_is_clipped() {
        let mut sim = sim();
        let (state, info) = sim.step(&Action::translate(0.0, 1.0)).expect("step should succeed");
        assert!(!info.collision);
        assert!((state.robot.pose.y - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_push_circle_along_center_line() {
        let mut sim = sim();
        let (state, info) = sim.step(&Action::translate(0.05, 0.0)).expect("step should succeed");
        assert!(!info.collision);
        assert_eq!(info.pushed, vec!["puck".to_string()]);
        let puck = state.body("puck").expect("puck exists");
        assert!((puck.pose.x - 0.70).abs() < 1e-9);
        assert!((puck.pose.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_collision_rejects_move() {
        let mut sim = sim();
        let before = sim.observe().expect("observe should succeed");
        // Bump into the rectangular block without holding it.
        let (state, info) = sim.step(&Action::translate(0.0, -0.05)).expect("step should succeed");
        assert!(!info.collision);
        let (state2, info2) = sim.step(&Action::translate(0.0, -0.05)).expect("step should succeed");
        assert!(info2.collision);
        assert_eq!(state2.robot.pose, state.robot.pose);
        assert_ne!(state.robot.pose, before.robot.pose);
    }

    #[test]
    fn test_bounds_reject_move() {
        let mut world = world();
        world.robot.pose = SE2Pose::new(0.12, 1.5, 0.0);
        let mut sim = KinematicSimulator::new(ActionSpace::default());
        sim.reset(&world).expect("reset should succeed");
        let (state, info) = sim.step(&Action::translate(-0.05, 0.0)).expect("step should succeed");
        assert!(info.collision);
        assert_eq!(state.robot.pose, world.robot.pose);
    }

    #[test]
    fn test_grasp_carry_release() {
        let mut world = world();
        world.bodies.retain(|b| b.name != "puck");
        let mut sim = KinematicSimulator::new(ActionSpace::default());
        sim.reset(&world).expect("reset should succeed");

        // Robot rim ends 0.025 above the block.
        sim.step(&Action::translate(0.0, -0.05)).expect("step should succeed");
        let (state, info) = sim.step(&Action::new(0.0, 0.0, 0.0, 1.0)).expect("step should succeed");
        assert_eq!(info.grasped.as_deref(), Some("block"));
        assert_eq!(state.robot.held_body(), Some("block"));

        let (state, _) = sim.step(&Action::new(-0.05, 0.0, 0.0, 1.0)).expect("step should succeed");
        let block = state.body("block").expect("block exists");
        assert!((block.pose.x - 0.45).abs() < 1e-9);
        assert!((block.pose.y - 0.8).abs() < 1e-9);

        let (state, info) = sim.step(&Action::noop()).expect("step should succeed");
        assert_eq!(info.released.as_deref(), Some("block"));
        assert!(state.robot.held.is_none());
        assert!(!state.robot.vacuum);
    }

    #[test]
    fn test_vacuum_without_nearby_body_grasps_nothing() {
        let mut world = world();
        world.robot.pose = SE2Pose::new(1.0, 1.6, 0.0);
        let mut sim = KinematicSimulator::new(ActionSpace::default());
        sim.reset(&world).expect("reset should succeed");
        let (state, info) = sim.step(&Action::new(0.0, 0.0, 0.0, 1.0)).expect("step should succeed");
        assert!(info.grasped.is_none());
        assert!(state.robot.vacuum);
        assert!(state.robot.held.is_none());
    }

    #[test]
    fn test_deterministic_replay() {
        let actions = [
            Action::translate(0.05, 0.0),
            Action::new(0.0, -0.05, 0.1, 1.0),
            Action::translate(0.03, 0.02),
        ];
        let run = || {
            let mut sim = sim();
            actions
                .iter()
                .map(|a| sim.step(a).expect("step should succeed").0)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
