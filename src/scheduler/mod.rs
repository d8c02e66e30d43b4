//! Parallel episode evaluation.
//!
//! ```text
//!                 ┌──────────────────┐
//!                 │ InstanceGenerator│
//!                 └────────┬─────────┘
//!                          │ instances (seed order)
//!                 ┌────────▼─────────┐
//!                 │    Semaphore     │  num_workers permits
//!                 └────────┬─────────┘
//!         ┌────────────────┼────────────────┐
//!         ▼                ▼                ▼
//!    ┌─────────┐      ┌─────────┐      ┌─────────┐
//!    │Episode 1│      │Episode 2│      │Episode N│   spawn_blocking
//!    └────┬────┘      └────┬────┘      └────┬────┘
//!         └────────────────┼────────────────┘
//!                          ▼ completion order
//!                 ┌──────────────────┐
//!                 │ BenchmarkReport  │
//!                 └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use prbench::scheduler::{ParallelEvaluator, PoolConfig};
//! use prbench::registry::{initialize, EvaluationOptions};
//!
//! let registry = initialize()?;
//! let pool = ParallelEvaluator::new(PoolConfig::new(8).with_episode_timeout(Duration::from_secs(30)))?;
//! let report = pool
//!     .evaluate(&registry, "motion2d-p2", agents, &seeds, &EvaluationOptions::new())
//!     .await?;
//! ```

pub mod worker_pool;

pub use worker_pool::{ParallelEvaluator, PoolConfig, PoolError, PoolStats, DEFAULT_CANCEL_GRACE};
