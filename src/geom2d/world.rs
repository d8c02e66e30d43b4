//! Object-centric world state: bounds, robot and bodies.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::pose::SE2Pose;
use super::shapes::{intersects, Shape, GEOM_EPS};

/// Axis-aligned world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl WorldBounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Whether the posed shape lies entirely within the bounds.
    pub fn contains_shape(&self, pose: &SE2Pose, shape: &Shape) -> bool {
        let (lo, hi) = shape.aabb(pose);
        lo.x >= self.min_x - GEOM_EPS
            && lo.y >= self.min_y - GEOM_EPS
            && hi.x <= self.max_x + GEOM_EPS
            && hi.y <= self.max_y + GEOM_EPS
    }
}

/// Role of a body in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    /// Static and solid.
    Obstacle,
    /// Region used by goal predicates; never collides.
    TargetRegion,
    /// Can be pushed or grasped; solid.
    Movable,
    /// Storage region used by goal predicates; never collides.
    Shelf,
}

impl BodyKind {
    pub fn is_solid(&self) -> bool {
        matches!(self, BodyKind::Obstacle | BodyKind::Movable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub name: String,
    pub kind: BodyKind,
    pub shape: Shape,
    pub pose: SE2Pose,
}

impl Body {
    pub fn new(name: impl Into<String>, kind: BodyKind, shape: Shape, pose: SE2Pose) -> Self {
        Self {
            name: name.into(),
            kind,
            shape,
            pose,
        }
    }

    pub fn overlaps(&self, other: &Body) -> bool {
        intersects(&self.pose, &self.shape, &other.pose, &other.shape)
    }
}

/// A body rigidly attached to the robot by the vacuum gripper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grasp {
    pub body: String,
    /// Pose of the held body in the robot frame.
    pub offset: SE2Pose,
}

/// Circular mobile base with a vacuum gripper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub pose: SE2Pose,
    pub base_radius: f64,
    pub vacuum: bool,
    pub held: Option<Grasp>,
}

impl RobotState {
    pub fn new(pose: SE2Pose, base_radius: f64) -> Self {
        Self {
            pose,
            base_radius,
            vacuum: false,
            held: None,
        }
    }

    pub fn shape(&self) -> Shape {
        Shape::circle(self.base_radius)
    }

    pub fn held_body(&self) -> Option<&str> {
        self.held.as_ref().map(|g| g.body.as_str())
    }
}

/// Full simulation state. Bodies keep their declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub bounds: WorldBounds,
    pub robot: RobotState,
    pub bodies: Vec<Body>,
}

impl WorldState {
    pub fn new(bounds: WorldBounds, robot: RobotState) -> Self {
        Self {
            bounds,
            robot,
            bodies: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.name == name)
    }

    pub fn bodies_of_kind(&self, kind: BodyKind) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(move |b| b.kind == kind)
    }

    /// Checks that the state is a legal starting layout.
    ///
    /// Shapes must be valid and names unique. The robot and every movable
    /// body must be inside the bounds and clear of all solid bodies.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.bounds.width() > 0.0 && self.bounds.height() > 0.0) {
            return Err("world bounds must have positive extent".to_string());
        }
        let robot_shape = self.robot.shape();
        if !robot_shape.is_valid() {
            return Err(format!("invalid robot radius {}", self.robot.base_radius));
        }
        if !self.bounds.contains_shape(&self.robot.pose, &robot_shape) {
            return Err("robot starts outside the world bounds".to_string());
        }

        let mut names = HashSet::new();
        for body in &self.bodies {
            if !names.insert(body.name.as_str()) {
                return Err(format!("duplicate body name '{}'", body.name));
            }
            if !body.shape.is_valid() {
                return Err(format!("body '{}' has an invalid shape", body.name));
            }
            if body.kind.is_solid() && intersects(&self.robot.pose, &robot_shape, &body.pose, &body.shape) {
                return Err(format!("robot starts in collision with '{}'", body.name));
            }
        }

        for (i, body) in self.bodies.iter().enumerate() {
            if body.kind != BodyKind::Movable {
                continue;
            }
            if !self.bounds.contains_shape(&body.pose, &body.shape) {
                return Err(format!("body '{}' starts outside the world bounds", body.name));
            }
            for (j, other) in self.bodies.iter().enumerate() {
                if i != j && other.kind.is_solid() && body.overlaps(other) {
                    return Err(format!("body '{}' overlaps '{}'", body.name, other.name));
                }
            }
        }

        if let Some(grasp) = &self.robot.held {
            if self.body(&grasp.body).is_none() {
                return Err(format!("robot holds unknown body '{}'", grasp.body));
            }
        }
        Ok(())
    }
}
