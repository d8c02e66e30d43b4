//! Trajectory recording for benchmark episodes.
//!
//! A trajectory holds the reset observation followed by one entry per step:
//! - **Action**: the raw action returned by the agent
//! - **Observation**: the world after the (clipped) action
//! - **Reward** and **Cost**: the task's step reward and safety cost
//! - **Done**: whether a goal or failure predicate held
//!
//! # Usage
//!
//! ```rust,ignore
//! use prbench::trajectory::{TrajectoryCollector, TrajectoryStorage};
//!
//! let mut collector = TrajectoryCollector::new(&instance, "random", 100);
//! collector.record_initial(adapter.reset(&instance)?);
//! let transition = adapter.step(&action)?;
//! collector.record_step(action, &transition);
//! let trajectory = collector.finalize(state, Some(reason), elapsed);
//!
//! TrajectoryStorage::new("/tmp/trajectories").save(&trajectory).await?;
//! ```

pub mod collector;
pub mod storage;
pub mod types;

pub use collector::TrajectoryCollector;
pub use storage::{StorageError, TrajectoryStorage};
pub use types::{Trajectory, TrajectoryStep};
