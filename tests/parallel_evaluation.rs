//! Worker pool evaluation matches sequential evaluation.

use std::sync::Arc;
use std::time::Duration;

use prbench::env::{Action, ActionSpace, Observation};
use prbench::registry::{builtin_registry, EvaluationOptions, TaskFilter};
use prbench::runner::{Agent, AgentFactory, RandomAgent, RunConfig};
use prbench::scheduler::{ParallelEvaluator, PoolConfig};
use prbench::{EpisodeState, TerminationReason};

fn random() -> Box<dyn Agent> {
    Box::new(RandomAgent::new(3, ActionSpace::default()))
}

struct SlowAgent;

impl Agent for SlowAgent {
    fn name(&self) -> &str {
        "slow"
    }

    fn act(&mut self, _observation: &Observation) -> Action {
        std::thread::sleep(Duration::from_millis(20));
        Action::noop()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_matches_sequential() {
    let registry = builtin_registry().expect("builtin registry should build");
    let seeds: Vec<u64> = (0..8).collect();
    let options = EvaluationOptions::new().with_run_config(RunConfig::new(25));

    let sequential = registry
        .evaluate_with("push-to-target", &random, &seeds, &options)
        .expect("sequential evaluate should succeed");

    let pool = ParallelEvaluator::new(PoolConfig::new(4)).expect("pool should build");
    let agents: Arc<dyn AgentFactory> = Arc::new(random);
    let parallel = pool
        .evaluate(&registry, "push-to-target", agents, &seeds, &options)
        .await
        .expect("parallel evaluate should succeed");

    assert_eq!(parallel.seeds(), sequential.seeds());
    assert_eq!(parallel.success_count(), sequential.success_count());
    assert_eq!(parallel.terminations(), sequential.terminations());
    for (p, s) in parallel.episodes().iter().zip(sequential.episodes()) {
        assert_eq!(p.seed(), s.seed());
        assert_eq!(p.steps(), s.steps());
        assert_eq!(p.state(), s.state());
        assert_eq!(p.total_reward(), s.total_reward());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timeout_cancels_slow_episode() {
    let registry = builtin_registry().expect("builtin registry should build");
    let pool = ParallelEvaluator::new(PoolConfig::new(2).with_episode_timeout(Duration::from_millis(100)))
        .expect("pool should build");
    let agents: Arc<dyn AgentFactory> = Arc::new(|| -> Box<dyn Agent> { Box::new(SlowAgent) });

    let report = pool
        .evaluate(&registry, "push-to-target", agents, &[1], &EvaluationOptions::new())
        .await
        .expect("evaluate should succeed");

    let episode = &report.episodes()[0];
    assert_eq!(episode.state(), EpisodeState::TimedOut);
    assert_eq!(episode.termination(), Some(&TerminationReason::Cancelled));
    assert!(episode.steps() > 0);
    assert!(episode.steps() < episode.step_budget());
    assert_eq!(report.success_rate(), 0.0);
    assert_eq!(pool.stats().timed_out, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_parallel_suite() {
    let registry = builtin_registry().expect("builtin registry should build");
    let pool = ParallelEvaluator::new(PoolConfig::new(3)).expect("pool should build");
    let agents: Arc<dyn AgentFactory> = Arc::new(random);
    let options = EvaluationOptions::new().with_run_config(RunConfig::new(5));

    let suite = pool
        .evaluate_suite(&registry, &TaskFilter::all(), agents, &[0, 1], &options)
        .await
        .expect("suite should build");
    assert_eq!(suite.tasks().len() + suite.failures().len(), registry.len());
    assert_eq!(suite.total_episodes(), suite.tasks().len() * 2);
}
