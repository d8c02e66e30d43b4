//! Instance generation for prbench tasks.
//!
//! 1. **Parameter Sampling** - seeded, declaration-ordered draws from a task's distributions
//! 2. **Instance Generation** - initial world layout plus a content fingerprint
//!
//! # Example
//!
//! ```ignore
//! use prbench::generator::InstanceGenerator;
//! use prbench::tasks::PushToTarget;
//!
//! let task = PushToTarget::new();
//! let instance = InstanceGenerator::new().generate(&task, 42)?;
//! ```

pub mod instance;
pub mod sampler;

pub use instance::{InstanceGenerator, TaskInstance};
pub use sampler::ParameterSampler;

use crate::error::GeneratorError;

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GeneratorError>;
