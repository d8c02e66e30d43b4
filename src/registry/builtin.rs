//! The default benchmark suite.

use crate::error::RegistryError;
use crate::tasks::builtin_tasks;

use super::BenchmarkRegistry;

/// Registry holding every built-in task.
pub fn builtin_registry() -> Result<BenchmarkRegistry, RegistryError> {
    let mut registry = BenchmarkRegistry::new();
    for task in builtin_tasks() {
        registry.register(task)?;
    }
    Ok(registry)
}
