//! Per-episode budgets.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::task::TaskSpec;

/// Step and wall-clock budgets for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Maximum number of steps; reaching it times the episode out.
    pub step_budget: u32,
    /// Optional wall-clock limit measured from reset.
    #[serde(default, with = "optional_millis")]
    pub wall_clock_limit: Option<Duration>,
}

impl RunConfig {
    pub fn new(step_budget: u32) -> Self {
        Self {
            step_budget,
            wall_clock_limit: None,
        }
    }

    /// Uses the task's default step budget.
    pub fn for_task(spec: &TaskSpec) -> Self {
        Self::new(spec.default_step_budget)
    }

    pub fn with_step_budget(mut self, step_budget: u32) -> Self {
        self.step_budget = step_budget;
        self
    }

    pub fn with_wall_clock_limit(mut self, limit: Duration) -> Self {
        self.wall_clock_limit = Some(limit);
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(100)
    }
}

mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
