//! Error types for prbench operations.
//!
//! Defines the error types for each subsystem:
//! - Environment adapter contract violations
//! - Parameter sampling and instance generation
//! - Episode lifecycle misuse
//! - Registry lookups, lifecycle and manifests
//! - Scoring and aggregation
//! - Report export

use thiserror::Error;

use crate::runner::EpisodeState;

/// Errors raised by the environment adapter when its contract is violated.
///
/// These are fatal to the current episode only; the episode runner records
/// them as a failed result and the rest of the benchmark keeps going.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EnvironmentError {
    #[error("Environment stepped or observed before reset")]
    NotReset,

    #[error("Environment stepped after the episode was done")]
    EpisodeDone,

    #[error("Instance belongs to task '{found}' but the adapter wraps task '{expected}'")]
    TaskMismatch { expected: String, found: String },

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Simulation error: {0}")]
    Simulation(String),
}

/// Errors that can occur during parameter sampling and instance generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid distribution for parameter '{name}': {reason}")]
    InvalidDistribution { name: String, reason: String },

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Parameter '{name}' has the wrong type: expected {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("Invalid task spec '{id}': {reason}")]
    InvalidTaskSpec { id: String, reason: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeneratorError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        GeneratorError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised when an episode is driven outside its lifecycle.
#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("Episode is closed in terminal state '{state}'")]
    Closed { state: EpisodeState },

    #[error("Episode has not been reset")]
    NotStarted,

    #[error("Episode was already reset (state '{state}')")]
    AlreadyStarted { state: EpisodeState },

    #[error("Environment error: {0}")]
    Environment(#[from] EnvironmentError),
}

/// Errors that can occur during scoring and aggregation.
#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("Cannot aggregate an empty set of episode results")]
    EmptyResults,

    #[error("Episode results mix tasks: expected '{expected}', found '{found}'")]
    MixedTasks { expected: String, found: String },

    #[error("Invalid weighting scheme: {0}")]
    InvalidWeights(String),
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Task '{0}' not found in registry")]
    UnknownTask(String),

    #[error("Task '{0}' already exists in registry")]
    DuplicateTask(String),

    #[error("Benchmark registry has not been initialized")]
    NotInitialized,

    #[error("Benchmark registry is already initialized")]
    AlreadyInitialized,

    #[error("Invalid suite manifest: {0}")]
    InvalidManifest(String),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors that can occur during report export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export path already exists: {0}")]
    PathExists(String),

    #[error("Nothing to export")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
