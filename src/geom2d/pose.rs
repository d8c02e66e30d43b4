//! Planar rigid transforms.

use std::f64::consts::PI;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A pose in SE(2): position plus heading in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SE2Pose {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl SE2Pose {
    /// Creates a pose, wrapping `theta` into `(-pi, pi]`.
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            x,
            y,
            theta: wrap_angle(theta),
        }
    }

    pub fn from_position(position: DVec2, theta: f64) -> Self {
        Self::new(position.x, position.y, theta)
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Unit vector along the pose heading.
    pub fn heading(&self) -> DVec2 {
        DVec2::new(self.theta.cos(), self.theta.sin())
    }

    /// Maps a point from this pose's local frame into the world frame.
    pub fn transform_point(&self, local: DVec2) -> DVec2 {
        rotate(local, self.theta) + self.position()
    }

    /// Maps a world point into this pose's local frame.
    pub fn inverse_transform_point(&self, world: DVec2) -> DVec2 {
        rotate(world - self.position(), -self.theta)
    }

    /// Composes `self * other` (apply `other` in the frame of `self`).
    pub fn compose(&self, other: &SE2Pose) -> SE2Pose {
        SE2Pose::from_position(
            self.transform_point(other.position()),
            self.theta + other.theta,
        )
    }

    /// Pose of `other` expressed in the frame of `self`.
    pub fn relative(&self, other: &SE2Pose) -> SE2Pose {
        SE2Pose::from_position(
            self.inverse_transform_point(other.position()),
            other.theta - self.theta,
        )
    }

    pub fn translated(&self, delta: DVec2) -> SE2Pose {
        SE2Pose {
            x: self.x + delta.x,
            y: self.y + delta.y,
            theta: self.theta,
        }
    }

    pub fn distance(&self, other: &SE2Pose) -> f64 {
        self.position().distance(other.position())
    }
}

/// Wraps an angle into `(-pi, pi]`.
pub fn wrap_angle(theta: f64) -> f64 {
    if !theta.is_finite() {
        return theta;
    }
    let mut wrapped = theta % (2.0 * PI);
    if wrapped <= -PI {
        wrapped += 2.0 * PI;
    } else if wrapped > PI {
        wrapped -= 2.0 * PI;
    }
    wrapped
}

/// Rotates a vector counter-clockwise by `theta`.
pub fn rotate(v: DVec2, theta: f64) -> DVec2 {
    let (s, c) = theta.sin_cos();
    DVec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < EPS);
        assert!((wrap_angle(-PI) - PI).abs() < EPS);
        assert!((wrap_angle(0.5) - 0.5).abs() < EPS);
        assert!((wrap_angle(-2.5 * PI) + 0.5 * PI).abs() < EPS);
    }

    #[test]
    fn test_transform_round_trip_point() {
        let pose = SE2Pose::new(1.0, 2.0, PI / 3.0);
        let local = DVec2::new(0.4, -0.2);
        let world = pose.transform_point(local);
        let back = pose.inverse_transform_point(world);
        assert!((back - local).length() < EPS);
    }

    #[test]
    fn test_compose_and_relative() {
        let robot = SE2Pose::new(1.0, 1.0, PI / 2.0);
        let offset = SE2Pose::new(0.3, 0.0, 0.0);
        let held = robot.compose(&offset);
        assert!((held.x - 1.0).abs() < EPS);
        assert!((held.y - 1.3).abs() < EPS);
        assert!((held.theta - PI / 2.0).abs() < EPS);

        let recovered = robot.relative(&held);
        assert!((recovered.x - 0.3).abs() < EPS);
        assert!(recovered.y.abs() < EPS);
        assert!(recovered.theta.abs() < EPS);
    }

    #[test]
    fn test_heading() {
        let pose = SE2Pose::new(0.0, 0.0, PI / 2.0);
        assert!(pose.heading().x.abs() < EPS);
        assert!((pose.heading().y - 1.0).abs() < EPS);
    }
}
