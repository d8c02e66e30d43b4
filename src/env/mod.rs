//! Environment adapter and the simulation contract it wraps.
//!
//! The adapter exposes `reset`/`step`/`observe` over any [`Simulation`] and
//! evaluates the owning task's predicates after each step.

mod action;
mod adapter;
mod observation;
mod simulation;

pub use action::{Action, ActionSpace};
pub use adapter::{EnvironmentAdapter, Transition};
pub use observation::{Observation, BODY_FEATURES, ROBOT_FEATURES};
pub use simulation::{Simulation, StepInfo};
