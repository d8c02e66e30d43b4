//! Agents that choose actions from observations.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::env::{Action, ActionSpace, Observation};
use crate::generator::TaskInstance;

/// A policy driven by the episode runner.
///
/// Agents may be stochastic; the runner records whatever they return.
pub trait Agent: Send {
    fn name(&self) -> &str;

    /// Called once per episode, before the first `act`.
    fn reset(&mut self, _instance: &TaskInstance) {}

    fn act(&mut self, observation: &Observation) -> Action;
}

/// Produces a fresh agent for every episode.
pub trait AgentFactory: Send + Sync {
    fn create(&self) -> Box<dyn Agent>;
}

impl<F> AgentFactory for F
where
    F: Fn() -> Box<dyn Agent> + Send + Sync,
{
    fn create(&self) -> Box<dyn Agent> {
        self()
    }
}

/// Always returns the zero action.
#[derive(Debug, Clone, Default)]
pub struct NoopAgent;

impl NoopAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Agent for NoopAgent {
    fn name(&self) -> &str {
        "noop"
    }

    fn act(&mut self, _observation: &Observation) -> Action {
        Action::noop()
    }
}

/// Uniformly random actions inside an action space.
///
/// The generator is reseeded on every reset from the agent seed and the
/// instance seed, so an episode's actions are reproducible.
#[derive(Debug, Clone)]
pub struct RandomAgent {
    seed: u64,
    space: ActionSpace,
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64, space: ActionSpace) -> Self {
        Self {
            seed,
            space,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn reset(&mut self, instance: &TaskInstance) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed ^ instance.seed.rotate_left(32));
    }

    fn act(&mut self, _observation: &Observation) -> Action {
        Action::new(
            self.rng.random_range(-self.space.max_dx..=self.space.max_dx),
            self.rng.random_range(-self.space.max_dy..=self.space.max_dy),
            self.rng.random_range(-self.space.max_dtheta..=self.space.max_dtheta),
            if self.rng.random::<f64>() < 0.5 { 0.0 } else { 1.0 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::InstanceGenerator;
    use crate::tasks::PushToTarget;

    #[test]
    fn test_random_agent_is_reproducible_per_instance() {
        let task = PushToTarget::new();
        let instance = InstanceGenerator::new().generate(&task, 3).expect("generation should succeed");
        let obs = Observation::new(0, instance.initial_state.clone());
        let space = ActionSpace::default();

        let mut a = RandomAgent::new(11, space);
        let mut b = RandomAgent::new(11, space);
        a.reset(&instance);
        b.reset(&instance);
        for _ in 0..5 {
            let action = a.act(&obs);
            assert_eq!(action, b.act(&obs));
            assert!(space.contains(&action));
        }
    }

    #[test]
    fn test_closure_factory() {
        let factory = || -> Box<dyn Agent> { Box::new(NoopAgent::new()) };
        let agent = factory.create();
        assert_eq!(agent.name(), "noop");
    }
}
