//! Observations handed to agents and predicates.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::geom2d::{Body, RobotState, Shape, WorldState};

/// Number of features describing the robot in [`Observation::vector`].
pub const ROBOT_FEATURES: usize = 6;
/// Number of features describing each body in [`Observation::vector`].
pub const BODY_FEATURES: usize = 5;

/// Snapshot of the world after `step` actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub step: u32,
    pub world: WorldState,
}

impl Observation {
    pub fn new(step: u32, world: WorldState) -> Self {
        Self { step, world }
    }

    pub fn robot(&self) -> &RobotState {
        &self.world.robot
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.world.body(name)
    }

    /// Flat feature view.
    ///
    /// Layout: `[x, y, theta, base_radius, vacuum, holding]` for the robot,
    /// then `[x, y, theta, width, height]` per body in declaration order.
    /// Circles report their diameter as width and height.
    pub fn vector(&self) -> Array1<f64> {
        let robot = &self.world.robot;
        let mut features = Vec::with_capacity(ROBOT_FEATURES + BODY_FEATURES * self.world.bodies.len());
        features.extend_from_slice(&[
            robot.pose.x,
            robot.pose.y,
            robot.pose.theta,
            robot.base_radius,
            if robot.vacuum { 1.0 } else { 0.0 },
            if robot.held.is_some() { 1.0 } else { 0.0 },
        ]);
        for body in &self.world.bodies {
            let (width, height) = match body.shape {
                Shape::Circle { radius } => (2.0 * radius, 2.0 * radius),
                Shape::Rectangle { width, height } => (width, height),
            };
            features.extend_from_slice(&[body.pose.x, body.pose.y, body.pose.theta, width, height]);
        }
        Array1::from(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom2d::{BodyKind, SE2Pose, WorldBounds};

    #[test]
    fn test_vector_layout() {
        let world = WorldState::new(
            WorldBounds::new(0.0, 1.0, 0.0, 1.0),
            RobotState::new(SE2Pose::new(0.2, 0.3, 0.1), 0.1),
        )
        .with_body(Body::new(
            "puck",
            BodyKind::Movable,
            Shape::circle(0.05),
            SE2Pose::new(0.6, 0.3, 0.0),
        ));
        let obs = Observation::new(3, world);
        let v = obs.vector();
        assert_eq!(v.len(), ROBOT_FEATURES + BODY_FEATURES);
        assert_eq!(v[0], 0.2);
        assert_eq!(v[3], 0.1);
        assert_eq!(v[4], 0.0);
        assert_eq!(v[ROBOT_FEATURES], 0.6);
        assert!((v[ROBOT_FEATURES + 3] - 0.1).abs() < 1e-12);
    }
}
