//! Prometheus-based monitoring for benchmark runs.
//!
//! # Example
//!
//! ```ignore
//! use prbench::metrics::{init_metrics, export_metrics};
//!
//! init_metrics().expect("Failed to initialize metrics");
//! // ... run episodes ...
//! let metrics_text = export_metrics();
//! ```

pub mod collectors;
pub mod prometheus;

pub use collectors::{EpisodeSample, MetricsCollector};
pub use prometheus::{export_metrics, init_metrics};

pub use prometheus::{
    ACTIVE_EPISODES, ACTIVE_WORKERS, EPISODES_TOTAL, EPISODE_DURATION, EPISODE_STEPS, REGISTRY,
    SAFETY_VIOLATIONS,
};
