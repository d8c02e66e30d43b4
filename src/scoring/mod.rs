//! Scoring engine.
//!
//! Pure functions over episode results: nothing here mutates a trajectory
//! or a result, and every aggregate is independent of input order.

pub mod aggregate;
pub mod interval;
pub mod metrics;
pub mod suite;

pub use aggregate::BenchmarkReport;
pub use interval::{wilson_interval, ConfidenceInterval, ConfidenceLevel};
pub use metrics::{step_efficiency, EpisodeMetrics};
pub use suite::{SuiteReport, TaskFailure, WeightingScheme};
