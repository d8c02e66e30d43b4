//! Process-wide registry lifecycle.
//!
//! Nothing is registered at load time. Callers run [`initialize`] (or
//! [`initialize_with`]) once, then share the read-only registry via [`global`].

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::error::RegistryError;

use super::builtin::builtin_registry;
use super::BenchmarkRegistry;

static GLOBAL: RwLock<Option<Arc<BenchmarkRegistry>>> = RwLock::new(None);

// The guarded value is only ever replaced whole, so a poisoned lock still holds a consistent value.
fn read() -> RwLockReadGuard<'static, Option<Arc<BenchmarkRegistry>>> {
    GLOBAL.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write() -> RwLockWriteGuard<'static, Option<Arc<BenchmarkRegistry>>> {
    GLOBAL.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Installs the built-in suite. Idempotent: later calls return the installed registry.
pub fn initialize() -> Result<Arc<BenchmarkRegistry>, RegistryError> {
    let mut slot = write();
    if let Some(existing) = slot.as_ref() {
        return Ok(Arc::clone(existing));
    }

    let registry = Arc::new(builtin_registry()?);
    info!(tasks = registry.len(), "Global benchmark registry initialized");
    *slot = Some(Arc::clone(&registry));
    Ok(registry)
}

/// Installs a caller-built registry.
///
/// # Errors
/// `AlreadyInitialized` if a registry is already installed.
pub fn initialize_with(registry: BenchmarkRegistry) -> Result<Arc<BenchmarkRegistry>, RegistryError> {
    let mut slot = write();
    if slot.is_some() {
        return Err(RegistryError::AlreadyInitialized);
    }

    let registry = Arc::new(registry);
    info!(tasks = registry.len(), "Global benchmark registry initialized");
    *slot = Some(Arc::clone(&registry));
    Ok(registry)
}

pub fn global() -> Result<Arc<BenchmarkRegistry>, RegistryError> {
    read().as_ref().cloned().ok_or(RegistryError::NotInitialized)
}

/// Removes the installed registry. Outstanding `Arc`s stay valid.
pub fn reset_for_testing() {
    *write() = None;
}
