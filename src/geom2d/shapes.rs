//! Shape primitives and the overlap and containment tests used by the
//! kinematic simulation and the task predicates.
//!
//! Rectangles are centered on their pose. Touching shapes do not count as
//! overlapping: a pair only overlaps when the penetration exceeds [`GEOM_EPS`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::pose::SE2Pose;

/// Numerical slack for overlap and containment tests.
pub const GEOM_EPS: f64 = 1e-9;

/// Body geometry in the body's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f64 },
    Rectangle { width: f64, height: f64 },
}

impl Shape {
    pub fn circle(radius: f64) -> Self {
        Shape::Circle { radius }
    }

    pub fn rectangle(width: f64, height: f64) -> Self {
        Shape::Rectangle { width, height }
    }

    /// Radius of the smallest circle around the pose containing the shape.
    pub fn bounding_radius(&self) -> f64 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rectangle { width, height } => 0.5 * width.hypot(height),
        }
    }

    /// Whether all dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        match *self {
            Shape::Circle { radius } => radius.is_finite() && radius > 0.0,
            Shape::Rectangle { width, height } => {
                width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
            }
        }
    }

    pub fn contains_point(&self, pose: &SE2Pose, point: DVec2) -> bool {
        match *self {
            Shape::Circle { radius } => pose.position().distance(point) <= radius + GEOM_EPS,
            Shape::Rectangle { width, height } => {
                let local = pose.inverse_transform_point(point);
                local.x.abs() <= 0.5 * width + GEOM_EPS && local.y.abs() <= 0.5 * height + GEOM_EPS
            }
        }
    }

    /// World-frame corners of a rectangle, counter-clockwise.
    pub fn corners(&self, pose: &SE2Pose) -> Option<[DVec2; 4]> {
        match *self {
            Shape::Circle { .. } => None,
            Shape::Rectangle { width, height } => {
                let (hw, hh) = (0.5 * width, 0.5 * height);
                Some([
                    pose.transform_point(DVec2::new(-hw, -hh)),
                    pose.transform_point(DVec2::new(hw, -hh)),
                    pose.transform_point(DVec2::new(hw, hh)),
                    pose.transform_point(DVec2::new(-hw, hh)),
                ])
            }
        }
    }

    /// Axis-aligned bounding box in world coordinates as `(min, max)`.
    pub fn aabb(&self, pose: &SE2Pose) -> (DVec2, DVec2) {
        match self.corners(pose) {
            Some(corners) => corners.iter().fold(
                (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
                |(lo, hi), c| (lo.min(*c), hi.max(*c)),
            ),
            None => {
                let r = DVec2::splat(self.bounding_radius());
                (pose.position() - r, pose.position() + r)
            }
        }
    }
}

/// Whether two posed shapes overlap.
pub fn intersects(a_pose: &SE2Pose, a: &Shape, b_pose: &SE2Pose, b: &Shape) -> bool {
    // Cheap reject before the exact tests.
    if a_pose.distance(b_pose) >= a.bounding_radius() + b.bounding_radius() {
        return false;
    }
    match (*a, *b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            a_pose.distance(b_pose) < ra + rb - GEOM_EPS
        }
        (Shape::Circle { radius }, Shape::Rectangle { width, height }) => {
            circle_rect_overlap(a_pose.position(), radius, b_pose, width, height)
        }
        (Shape::Rectangle { width, height }, Shape::Circle { radius }) => {
            circle_rect_overlap(b_pose.position(), radius, a_pose, width, height)
        }
        (Shape::Rectangle { .. }, Shape::Rectangle { .. }) => match (a.corners(a_pose), b.corners(b_pose)) {
            (Some(ca), Some(cb)) => rect_rect_overlap(&ca, &cb),
            _ => false,
        },
    }
}

/// Whether `inner` lies entirely within `outer`.
pub fn is_inside(inner_pose: &SE2Pose, inner: &Shape, outer_pose: &SE2Pose, outer: &Shape) -> bool {
    match (*inner, *outer) {
        (Shape::Circle { radius: r }, Shape::Circle { radius: outer_r }) => {
            inner_pose.distance(outer_pose) + r <= outer_r + GEOM_EPS
        }
        (Shape::Circle { radius }, Shape::Rectangle { width, height }) => {
            let local = outer_pose.inverse_transform_point(inner_pose.position());
            local.x.abs() + radius <= 0.5 * width + GEOM_EPS
                && local.y.abs() + radius <= 0.5 * height + GEOM_EPS
        }
        (Shape::Rectangle { .. }, _) => match inner.corners(inner_pose) {
            Some(corners) => corners.iter().all(|c| outer.contains_point(outer_pose, *c)),
            None => false,
        },
    }
}

/// Gap between a circle and a posed shape; negative when they overlap.
pub fn circle_clearance(center: DVec2, radius: f64, pose: &SE2Pose, shape: &Shape) -> f64 {
    match *shape {
        Shape::Circle { radius: other } => center.distance(pose.position()) - radius - other,
        Shape::Rectangle { width, height } => {
            let half = DVec2::new(0.5 * width, 0.5 * height);
            let local = pose.inverse_transform_point(center);
            let closest = local.clamp(-half, half);
            local.distance(closest) - radius
        }
    }
}

fn circle_rect_overlap(center: DVec2, radius: f64, rect_pose: &SE2Pose, width: f64, height: f64) -> bool {
    let half = DVec2::new(0.5 * width, 0.5 * height);
    let local = rect_pose.inverse_transform_point(center);
    let closest = local.clamp(-half, half);
    local.distance(closest) < radius - GEOM_EPS
}

/// Separating axis test for two convex quadrilaterals.
fn rect_rect_overlap(a: &[DVec2; 4], b: &[DVec2; 4]) -> bool {
    for poly in [a, b] {
        for i in 0..2 {
            let edge = poly[i + 1] - poly[i];
            let axis = DVec2::new(-edge.y, edge.x).normalize_or_zero();
            if axis == DVec2::ZERO {
                continue;
            }
            let (a_min, a_max) = project(a, axis);
            let (b_min, b_max) = project(b, axis);
            if a_max - b_min <= GEOM_EPS || b_max - a_min <= GEOM_EPS {
                return false;
            }
        }
    }
    true
}

fn project(corners: &[DVec2; 4], axis: DVec2) -> (f64, f64) {
    corners.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        let d = c.dot(axis);
        (lo.min(d), hi.max(d))
    })
}
