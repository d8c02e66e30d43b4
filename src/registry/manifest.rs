//! YAML suite manifests.
//!
//! A manifest declares task variants built from the built-in families:
//!
//! ```yaml
//! name: short-push
//! tasks:
//!   - id: push-short
//!     kind: push_to_target
//!     step_budget: 50
//!     tags: [short]
//!     overrides:
//!       distance: { type: uniform, low: 0.1, high: 0.3 }
//!   - id: motion2d-p5
//!     kind: motion2d
//!     passages: 5
//!     tier: hard
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::difficulty::DifficultyTier;
use crate::error::RegistryError;
use crate::task::{is_valid_task_id, Distribution, TaskDefinition};
use crate::tasks::TaskKind;

use super::BenchmarkRegistry;

/// One task variant in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    #[serde(flatten)]
    pub kind: TaskKind,
    #[serde(default)]
    pub tier: Option<DifficultyTier>,
    #[serde(default)]
    pub step_budget: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    /// Extra tags, appended to the family's own.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Replacement distributions; each must name a declared parameter.
    #[serde(default)]
    pub overrides: BTreeMap<String, Distribution>,
}

impl ManifestEntry {
    pub fn build(&self) -> Result<Arc<dyn TaskDefinition>, RegistryError> {
        if !is_valid_task_id(&self.id) {
            return Err(RegistryError::InvalidManifest(format!(
                "invalid task id '{}'",
                self.id
            )));
        }

        let task = self.kind.instantiate(|spec| {
            spec.id = self.id.clone();
            if let Some(tier) = self.tier {
                spec.tier = tier;
            }
            if let Some(budget) = self.step_budget {
                spec.default_step_budget = budget;
            }
            if let Some(description) = &self.description {
                spec.description = description.clone();
            }
            for tag in &self.tags {
                if !spec.has_tag(tag) {
                    spec.tags.push(tag.clone());
                }
            }
            for (name, distribution) in &self.overrides {
                spec.override_parameter(name, distribution.clone())?;
            }
            Ok(())
        })?;
        Ok(task)
    }
}

/// A named list of task variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteManifest {
    #[serde(default)]
    pub name: String,
    pub tasks: Vec<ManifestEntry>,
}

impl SuiteManifest {
    pub fn from_yaml(yaml: &str) -> Result<Self, RegistryError> {
        let manifest: SuiteManifest = serde_yaml::from_str(yaml)?;
        if manifest.tasks.is_empty() {
            return Err(RegistryError::InvalidManifest(
                "manifest declares no tasks".to_string(),
            ));
        }
        Ok(manifest)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Builds every entry into a fresh registry. Fails on the first bad entry.
    pub fn into_registry(&self) -> Result<BenchmarkRegistry, RegistryError> {
        let mut registry = BenchmarkRegistry::new();
        self.register_into(&mut registry)?;
        Ok(registry)
    }

    /// Adds every entry to `registry`. Entries are all built before any is
    /// registered, so a bad manifest leaves `registry` unchanged.
    pub fn register_into(&self, registry: &mut BenchmarkRegistry) -> Result<(), RegistryError> {
        let tasks = self
            .tasks
            .iter()
            .map(ManifestEntry::build)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = std::collections::BTreeSet::new();
        for task in &tasks {
            let id = &task.spec().id;
            if registry.contains(id) || !seen.insert(id.clone()) {
                return Err(RegistryError::DuplicateTask(id.clone()));
            }
        }

        for task in tasks {
            registry.register(task)?;
        }
        debug!(manifest = %self.name, tasks = self.tasks.len(), "Registered manifest tasks");
        Ok(())
    }
}
