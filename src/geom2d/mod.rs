//! Planar geometry and the kinematic reference simulation.
//!
//! Provides SE(2) poses, circle and rectangle shapes with overlap and
//! containment tests, the object-centric [`WorldState`], and
//! [`KinematicSimulator`], which steps a world by resolving poses only.

mod pose;
mod shapes;
mod sim;
mod world;

pub use pose::{rotate, wrap_angle, SE2Pose};
pub use shapes::{circle_clearance, intersects, is_inside, Shape, GEOM_EPS};
pub use sim::{KinematicSimulator, DEFAULT_GRASP_MARGIN};
pub use world::{Body, BodyKind, Grasp, RobotState, WorldBounds, WorldState};
