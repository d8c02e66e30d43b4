//! prbench: physical reasoning benchmark for 2D robot tasks.
//!
//! This library provides seeded task generation, a kinematic 2D simulator,
//! an episode runner with step and wall-clock budgets, trajectory recording,
//! and scoring with confidence intervals across a task registry.

// Core modules
pub mod config;
pub mod difficulty;
pub mod env;
pub mod error;
pub mod export;
pub mod generator;
pub mod geom2d;
pub mod metrics;
pub mod registry;
pub mod runner;
pub mod scheduler;
pub mod scoring;
pub mod task;
pub mod tasks;
pub mod telemetry;
pub mod trajectory;

// Re-export commonly used error types
pub use error::{EnvironmentError, EpisodeError, ExportError, GeneratorError, RegistryError, ScoringError};

pub use config::{BenchmarkConfig, ConfigError};
pub use difficulty::DifficultyTier;
pub use env::{Action, Observation};
pub use generator::{InstanceGenerator, TaskInstance};
pub use registry::{BenchmarkRegistry, EvaluationOptions, TaskFilter};
pub use runner::{Agent, EpisodeResult, EpisodeRunner, EpisodeState, RunConfig, TerminationReason};
pub use scoring::{BenchmarkReport, SuiteReport};
pub use task::{TaskDefinition, TaskSpec};
pub use trajectory::Trajectory;
