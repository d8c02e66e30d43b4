//! Episode runner for benchmark evaluation.
//!
//! # Architecture
//!
//! ```text
//! TaskInstance → Episode (adapter + collector) ⇄ Agent → EpisodeOutcome
//! ```
//!
//! The runner:
//! 1. Resets the environment adapter with the instance
//! 2. Asks the agent for an action and steps the episode
//! 3. Classifies each step as goal, failure, budget or wall-clock termination
//! 4. Finalizes the trajectory and derives an [`EpisodeResult`]
//!
//! # Example
//!
//! ```ignore
//! use prbench::runner::{EpisodeRunner, RandomAgent};
//!
//! let runner = EpisodeRunner::for_task(task.clone());
//! let mut agent = RandomAgent::new(0, task.spec().action_space);
//! let outcome = runner.run(&instance, &mut agent);
//! println!("{} after {} steps", outcome.result.state(), outcome.result.steps());
//! ```

pub mod agents;
pub mod config;
pub mod episode;
pub mod executor;
pub mod result;
pub mod state;

pub use agents::{Agent, AgentFactory, NoopAgent, RandomAgent};
pub use config::RunConfig;
pub use episode::Episode;
pub use executor::{CancelToken, EpisodeRunner};
pub use result::{EpisodeOutcome, EpisodeResult};
pub use state::{EpisodeState, TerminationReason};
