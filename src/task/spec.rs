//! Declarative task specifications.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::env::ActionSpace;
use crate::error::GeneratorError;

use super::distribution::Distribution;

static TASK_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("Invalid regex for task ids"));

/// Whether `id` is a legal task identifier.
pub fn is_valid_task_id(id: &str) -> bool {
    TASK_ID_PATTERN.is_match(id)
}

/// One declared parameter. Declaration order is sampling order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub distribution: Distribution,
}

/// Immutable description of a task family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub description: String,
    /// Human-readable statement of the goal predicate.
    pub goal: String,
    pub tier: DifficultyTier,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub action_space: ActionSpace,
    pub default_step_budget: u32,
}

impl TaskSpec {
    pub fn new(id: impl Into<String>, tier: DifficultyTier) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            goal: String::new(),
            tier,
            tags: Vec::new(),
            parameters: Vec::new(),
            action_space: ActionSpace::default(),
            default_step_budget: tier.default_step_budget(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, distribution: Distribution) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            distribution,
        });
        self
    }

    pub fn with_action_space(mut self, action_space: ActionSpace) -> Self {
        self.action_space = action_space;
        self
    }

    pub fn with_step_budget(mut self, budget: u32) -> Self {
        self.default_step_budget = budget;
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Replaces the distribution of a declared parameter.
    pub fn override_parameter(&mut self, name: &str, distribution: Distribution) -> Result<(), GeneratorError> {
        let id = &self.id;
        let param = self
            .parameters
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| GeneratorError::invalid(name, format!("not declared by task '{}'", id)))?;
        param.distribution = distribution;
        Ok(())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn validate(&self) -> Result<(), GeneratorError> {
        let invalid = |reason: String| GeneratorError::InvalidTaskSpec {
            id: self.id.clone(),
            reason,
        };
        if !is_valid_task_id(&self.id) {
            return Err(invalid("id must match ^[a-z0-9][a-z0-9_-]*$".to_string()));
        }
        if self.default_step_budget == 0 {
            return Err(invalid("default step budget must be positive".to_string()));
        }
        self.action_space.validate().map_err(invalid)?;

        let mut seen = std::collections::HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(invalid(format!("parameter '{}' declared twice", param.name)));
            }
            param.distribution.validate(&param.name)?;
        }
        Ok(())
    }
}
