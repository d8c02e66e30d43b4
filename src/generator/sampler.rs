//! Deterministic parameter sampling.
//!
//! Parameters are drawn in declaration order from one ChaCha8 stream seeded
//! with the instance seed. There is no global random state, so the same seed
//! yields the same assignment in any thread or process.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::generator::Result;
use crate::task::{ParameterAssignment, ParameterSpec};

/// Seeded sampler for task parameter declarations.
///
/// # Example
///
/// ```ignore
/// let sampler = ParameterSampler::new(42);
/// let params = sampler.sample(&task.spec().parameters)?;
/// ```
pub struct ParameterSampler {
    seed: u64,
    rng: ChaCha8Rng,
}

impl ParameterSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Samples every declared parameter.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::InvalidDistribution` if a declaration is invalid.
    pub fn sample(mut self, parameters: &[ParameterSpec]) -> Result<ParameterAssignment> {
        let mut assignment = ParameterAssignment::new();
        for param in parameters {
            param.distribution.validate(&param.name)?;
            let value = param.distribution.draw(&mut self.rng)?;
            trace!(seed = self.seed, name = %param.name, value = ?value, "Sampled parameter");
            assignment.insert(param.name.clone(), value);
        }
        Ok(assignment)
    }
}
