//! Robot actions and their bounds.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// One control command: base displacement, rotation and vacuum level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    pub dx: f64,
    pub dy: f64,
    pub dtheta: f64,
    /// Values above 0.5 switch the vacuum on.
    pub vacuum: f64,
}

impl Action {
    pub fn new(dx: f64, dy: f64, dtheta: f64, vacuum: f64) -> Self {
        Self {
            dx,
            dy,
            dtheta,
            vacuum,
        }
    }

    /// Pure base translation with the vacuum off.
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self::new(dx, dy, 0.0, 0.0)
    }

    pub fn noop() -> Self {
        Self::default()
    }

    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite() && self.dtheta.is_finite() && self.vacuum.is_finite()
    }

    pub fn vacuum_on(&self) -> bool {
        self.vacuum > 0.5
    }
}

/// Symmetric per-step limits on the base motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionSpace {
    pub max_dx: f64,
    pub max_dy: f64,
    pub max_dtheta: f64,
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self {
            max_dx: 0.05,
            max_dy: 0.05,
            max_dtheta: PI / 16.0,
        }
    }
}

impl ActionSpace {
    pub fn new(max_dx: f64, max_dy: f64, max_dtheta: f64) -> Self {
        Self {
            max_dx,
            max_dy,
            max_dtheta,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("max_dx", self.max_dx),
            ("max_dy", self.max_dy),
            ("max_dtheta", self.max_dtheta),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be finite and positive, got {}", name, value));
            }
        }
        Ok(())
    }

    pub fn clip(&self, action: &Action) -> Action {
        Action {
            dx: action.dx.clamp(-self.max_dx, self.max_dx),
            dy: action.dy.clamp(-self.max_dy, self.max_dy),
            dtheta: action.dtheta.clamp(-self.max_dtheta, self.max_dtheta),
            vacuum: action.vacuum.clamp(0.0, 1.0),
        }
    }

    pub fn contains(&self, action: &Action) -> bool {
        self.clip(action) == *action
    }
}
