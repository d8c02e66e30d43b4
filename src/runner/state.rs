//! Episode lifecycle states and termination reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of one episode.
///
/// `Pending → Running → {Succeeded, Failed, TimedOut}`. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeState {
    Pending,
    Running,
    Succeeded,
    Failed,
    TimedOut,
}

impl EpisodeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EpisodeState::Succeeded | EpisodeState::Failed | EpisodeState::TimedOut
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeState::Pending => "pending",
            EpisodeState::Running => "running",
            EpisodeState::Succeeded => "succeeded",
            EpisodeState::Failed => "failed",
            EpisodeState::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for EpisodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an episode reached its terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum TerminationReason {
    GoalReached,
    FailurePredicate,
    StepBudgetExhausted,
    WallClockExceeded,
    Cancelled,
    /// The adapter or simulation reported an error.
    EnvironmentFault(String),
    /// The worker running the episode panicked.
    WorkerCrashed(String),
}

impl TerminationReason {
    /// Stable reason code used in reports and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            TerminationReason::GoalReached => "goal_reached",
            TerminationReason::FailurePredicate => "failure_predicate",
            TerminationReason::StepBudgetExhausted => "step_budget_exhausted",
            TerminationReason::WallClockExceeded => "wall_clock_exceeded",
            TerminationReason::Cancelled => "cancelled",
            TerminationReason::EnvironmentFault(_) => "environment_fault",
            TerminationReason::WorkerCrashed(_) => "worker_crashed",
        }
    }

    /// Terminal state this reason leads to.
    pub fn terminal_state(&self) -> EpisodeState {
        match self {
            TerminationReason::GoalReached => EpisodeState::Succeeded,
            TerminationReason::FailurePredicate
            | TerminationReason::EnvironmentFault(_)
            | TerminationReason::WorkerCrashed(_) => EpisodeState::Failed,
            TerminationReason::StepBudgetExhausted
            | TerminationReason::WallClockExceeded
            | TerminationReason::Cancelled => EpisodeState::TimedOut,
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::EnvironmentFault(detail) | TerminationReason::WorkerCrashed(detail) => {
                write!(f, "{}: {}", self.code(), detail)
            }
            _ => f.write_str(self.code()),
        }
    }
}
