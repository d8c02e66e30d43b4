//! Task selection criteria.

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyTier;
use crate::task::TaskSpec;

/// Criteria for [`super::BenchmarkRegistry::list_tasks`].
///
/// All set criteria must match (AND). Within `tags`, any one tag is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default)]
    pub tier: Option<DifficultyTier>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub id_prefix: Option<String>,
}

impl TaskFilter {
    /// Matches every task.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_tier(mut self, tier: DifficultyTier) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    pub fn matches(&self, spec: &TaskSpec) -> bool {
        if let Some(tier) = self.tier {
            if spec.tier != tier {
                return false;
            }
        }

        if !self.tags.is_empty() && !self.tags.iter().any(|tag| spec.has_tag(tag)) {
            return false;
        }

        if let Some(prefix) = &self.id_prefix {
            if !spec.id.starts_with(prefix.as_str()) {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matching() {
        let spec = TaskSpec::new("motion2d-p2", DifficultyTier::Medium).with_tag("navigation");

        assert!(TaskFilter::all().matches(&spec));
        assert!(TaskFilter::all().with_tier(DifficultyTier::Medium).matches(&spec));
        assert!(!TaskFilter::all().with_tier(DifficultyTier::Hard).matches(&spec));
        assert!(TaskFilter::all().with_tag("grasp").with_tag("navigation").matches(&spec));
        assert!(!TaskFilter::all().with_tag("grasp").matches(&spec));
        assert!(TaskFilter::all().with_prefix("motion2d").matches(&spec));
        assert!(!TaskFilter::all()
            .with_prefix("motion2d")
            .with_tier(DifficultyTier::Easy)
            .matches(&spec));
    }
}
