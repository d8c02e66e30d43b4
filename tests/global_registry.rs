//! Process-wide registry in a fresh process.

use prbench::registry::{global, initialize, TaskFilter};
use prbench::DifficultyTier;
use prbench::RegistryError;

#[test]
fn test_global_registry_requires_initialization() {
    assert!(matches!(global(), Err(RegistryError::NotInitialized)));

    let registry = initialize().expect("initialize should succeed");
    let shared = global().expect("global should be set");
    assert_eq!(registry.len(), shared.len());

    let easy = shared.list_tasks(&TaskFilter::all().with_tier(DifficultyTier::Easy));
    assert!(easy.contains(&"push-to-target".to_string()));
    let mut sorted = easy.clone();
    sorted.sort();
    assert_eq!(easy, sorted);
}
