//! High-level recording interface over the raw Prometheus metrics.

use super::prometheus::{
    ACTIVE_EPISODES, ACTIVE_WORKERS, EPISODES_TOTAL, EPISODE_DURATION, EPISODE_STEPS,
    SAFETY_VIOLATIONS,
};

/// Summary of a finished episode, as seen by metrics.
#[derive(Debug, Clone, Copy)]
pub struct EpisodeSample<'a> {
    pub task_id: &'a str,
    pub outcome: &'a str,
    pub steps: u32,
    pub duration_secs: f64,
    pub safety_violations: u32,
}

/// Metrics collector for benchmark episodes.
///
/// Every method is a no-op until [`super::init_metrics`] has run, so library
/// code can record unconditionally.
///
/// # Example
///
/// ```ignore
/// use prbench::metrics::{init_metrics, EpisodeSample, MetricsCollector};
///
/// init_metrics()?;
/// let collector = MetricsCollector::new();
/// collector.episode_started();
/// collector.record_episode(EpisodeSample {
///     task_id: "push-to-target",
///     outcome: "succeeded",
///     steps: 12,
///     duration_secs: 0.004,
///     safety_violations: 0,
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector;

impl MetricsCollector {
    pub fn new() -> Self {
        Self
    }

    /// Records a finished episode and decrements the active gauge.
    pub fn record_episode(&self, sample: EpisodeSample<'_>) {
        if let Some(total) = EPISODES_TOTAL.get() {
            total
                .with_label_values(&[sample.task_id, sample.outcome])
                .inc();
        }

        if let Some(steps) = EPISODE_STEPS.get() {
            steps
                .with_label_values(&[sample.task_id])
                .observe(sample.steps as f64);
        }

        if let Some(duration) = EPISODE_DURATION.get() {
            duration
                .with_label_values(&[sample.task_id])
                .observe(sample.duration_secs);
        }

        if sample.safety_violations > 0 {
            if let Some(violations) = SAFETY_VIOLATIONS.get() {
                violations
                    .with_label_values(&[sample.task_id])
                    .inc_by(sample.safety_violations as f64);
            }
        }

        if let Some(active) = ACTIVE_EPISODES.get() {
            active.dec();
        }

        tracing::trace!(
            task_id = sample.task_id,
            outcome = sample.outcome,
            steps = sample.steps,
            duration_secs = sample.duration_secs,
            "Recorded episode metric"
        );
    }

    pub fn episode_started(&self) {
        if let Some(active) = ACTIVE_EPISODES.get() {
            active.inc();
        }
    }

    pub fn update_workers(&self, count: usize) {
        if let Some(active_workers) = ACTIVE_WORKERS.get() {
            active_workers.set(count as f64);
        }

        tracing::trace!(count = count, "Updated active workers metric");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::init_metrics;

    #[test]
    fn test_recording_without_init_is_harmless() {
        let collector = MetricsCollector::new();
        collector.episode_started();
        collector.record_episode(EpisodeSample {
            task_id: "push-to-target",
            outcome: "timed_out",
            steps: 100,
            duration_secs: 0.01,
            safety_violations: 0,
        });
    }

    #[test]
    fn test_record_episode() {
        let _ = init_metrics();
        let collector = MetricsCollector::new();

        collector.episode_started();
        collector.record_episode(EpisodeSample {
            task_id: "motion2d-p1",
            outcome: "succeeded",
            steps: 40,
            duration_secs: 0.02,
            safety_violations: 3,
        });
        collector.update_workers(4);

        let text = crate::metrics::export_metrics();
        assert!(text.contains("prbench_episodes_total"));
        assert!(text.contains("motion2d-p1"));
    }
}
