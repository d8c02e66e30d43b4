//! Prometheus metrics registration and export.
//!
//! Every metric lives in a `OnceLock` so recording code can check for
//! initialization without locking.

use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::{Mutex, OnceLock};

/// Global Prometheus registry for all prbench metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Finished episodes, labeled by task and terminal state.
pub static EPISODES_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Steps taken per episode, labeled by task.
pub static EPISODE_STEPS: OnceLock<HistogramVec> = OnceLock::new();

/// Episode wall-clock duration in seconds, labeled by task.
pub static EPISODE_DURATION: OnceLock<HistogramVec> = OnceLock::new();

/// Episodes currently running.
pub static ACTIVE_EPISODES: OnceLock<IntGauge> = OnceLock::new();

/// Steps with a non-zero safety cost, labeled by task.
pub static SAFETY_VIOLATIONS: OnceLock<CounterVec> = OnceLock::new();

static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Workers currently holding a pool permit.
pub static ACTIVE_WORKERS: OnceLock<Gauge> = OnceLock::new();

/// Initialize all metrics and register them with the registry.
///
/// Safe to call more than once; later calls leave the first registry in place.
///
/// # Errors
///
/// Returns a `prometheus::Error` if a metric definition is invalid.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let episodes_total = CounterVec::new(
        Opts::new("prbench_episodes_total", "Total number of finished episodes"),
        &["task", "outcome"],
    )?;

    let episode_steps = HistogramVec::new(
        HistogramOpts::new("prbench_episode_steps", "Steps taken per episode")
            .buckets(vec![10.0, 50.0, 100.0, 200.0, 300.0, 500.0, 1000.0]),
        &["task"],
    )?;

    let episode_duration = HistogramVec::new(
        HistogramOpts::new(
            "prbench_episode_duration_seconds",
            "Episode wall-clock duration in seconds",
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        &["task"],
    )?;

    let active_episodes = IntGauge::new("prbench_active_episodes", "Episodes currently running")?;

    let safety_violations = CounterVec::new(
        Opts::new(
            "prbench_safety_violations_total",
            "Steps that incurred a safety cost",
        ),
        &["task"],
    )?;

    let active_workers = Gauge::new("prbench_active_workers", "Number of active pool workers")?;

    registry.register(Box::new(episodes_total.clone()))?;
    registry.register(Box::new(episode_steps.clone()))?;
    registry.register(Box::new(episode_duration.clone()))?;
    registry.register(Box::new(active_episodes.clone()))?;
    registry.register(Box::new(safety_violations.clone()))?;
    registry.register(Box::new(active_workers.clone()))?;

    let _ = REGISTRY.set(registry);
    let _ = EPISODES_TOTAL.set(episodes_total);
    let _ = EPISODE_STEPS.set(episode_steps);
    let _ = EPISODE_DURATION.set(episode_duration);
    let _ = ACTIVE_EPISODES.set(active_episodes);
    let _ = SAFETY_VIOLATIONS.set(safety_violations);
    let _ = ACTIVE_WORKERS.set(active_workers);

    tracing::info!("Prometheus metrics initialized");

    Ok(())
}

/// Export all registered metrics in Prometheus text format.
pub fn export_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return "# Metrics not initialized. Call init_metrics() first.\n".to_string();
    };

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}\n", e);
    }

    String::from_utf8(buffer)
        .unwrap_or_else(|e| format!("# Error converting metrics to UTF-8: {}\n", e))
}
