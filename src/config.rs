//! Benchmark configuration.
//!
//! Settings load from YAML, then `PRBENCH_*` environment variables override
//! individual fields, then the result is validated.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::RegistryError;
use crate::export::ReportExporter;
use crate::registry::{builtin_registry, BenchmarkRegistry, EvaluationOptions, SuiteManifest};
use crate::runner::RunConfig;
use crate::scheduler::PoolConfig;
use crate::scoring::{ConfidenceLevel, WeightingScheme};
use crate::task::TaskSpec;
use crate::telemetry;
use crate::trajectory::TrajectoryStorage;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// IO error while reading configuration.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Settings for an evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Episodes running at once in parallel evaluation.
    pub num_workers: usize,
    /// Overrides every task's default step budget.
    pub step_budget: Option<u32>,
    pub wall_clock_limit_ms: Option<u64>,
    /// Per-episode timeout enforced by the worker pool.
    pub episode_timeout_ms: Option<u64>,
    pub confidence: ConfidenceLevel,
    pub weighting: WeightingScheme,
    /// Seeds evaluated are `base_seed .. base_seed + num_seeds`.
    pub base_seed: u64,
    pub num_seeds: u64,
    pub manifest: Option<PathBuf>,
    pub trajectory_dir: Option<PathBuf>,
    pub report_dir: PathBuf,
    pub log_level: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            step_budget: None,
            wall_clock_limit_ms: None,
            episode_timeout_ms: None,
            confidence: ConfidenceLevel::P95,
            weighting: WeightingScheme::Unweighted,
            base_seed: 0,
            num_seeds: 20,
            manifest: None,
            trajectory_dir: None,
            report_dir: PathBuf::from("./reports"),
            log_level: "info".to_string(),
        }
    }
}

impl BenchmarkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Defaults overridden by the process environment, validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// File (if given), then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup` and validates the result.
    ///
    /// # Environment Variables
    ///
    /// - `PRBENCH_NUM_WORKERS`: Parallel episodes (default: 4)
    /// - `PRBENCH_STEP_BUDGET`: Step budget override for every task
    /// - `PRBENCH_WALL_CLOCK_MS`: Per-episode wall-clock budget
    /// - `PRBENCH_EPISODE_TIMEOUT_MS`: Worker pool timeout per episode
    /// - `PRBENCH_CONFIDENCE`: 90, 95 or 99 (default: 95)
    /// - `PRBENCH_WEIGHTING`: `unweighted` or `tier` (default: unweighted)
    /// - `PRBENCH_BASE_SEED`, `PRBENCH_NUM_SEEDS`: Seed range (default: 0, 20)
    /// - `PRBENCH_MANIFEST`: Suite manifest path
    /// - `PRBENCH_TRAJECTORY_DIR`: Where trajectories are saved
    /// - `PRBENCH_REPORT_DIR`: Where reports are written (default: ./reports)
    /// - `PRBENCH_LOG_LEVEL`: Default tracing level (default: info)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("PRBENCH_NUM_WORKERS") {
            self.num_workers = parse_env_value(&val, "PRBENCH_NUM_WORKERS")?;
        }

        if let Some(val) = lookup("PRBENCH_STEP_BUDGET") {
            self.step_budget = Some(parse_env_value(&val, "PRBENCH_STEP_BUDGET")?);
        }

        if let Some(val) = lookup("PRBENCH_WALL_CLOCK_MS") {
            self.wall_clock_limit_ms = Some(parse_env_value(&val, "PRBENCH_WALL_CLOCK_MS")?);
        }

        if let Some(val) = lookup("PRBENCH_EPISODE_TIMEOUT_MS") {
            self.episode_timeout_ms = Some(parse_env_value(&val, "PRBENCH_EPISODE_TIMEOUT_MS")?);
        }

        if let Some(val) = lookup("PRBENCH_CONFIDENCE") {
            self.confidence = val.parse().map_err(|message| ConfigError::InvalidValue {
                key: "PRBENCH_CONFIDENCE".to_string(),
                message,
            })?;
        }

        if let Some(val) = lookup("PRBENCH_WEIGHTING") {
            self.weighting = match val.trim().to_lowercase().as_str() {
                "unweighted" => WeightingScheme::Unweighted,
                "tier" | "tier_weighted" => WeightingScheme::tier_defaults(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "PRBENCH_WEIGHTING".to_string(),
                        message: format!("expected 'unweighted' or 'tier', got '{}'", val),
                    })
                }
            };
        }

        if let Some(val) = lookup("PRBENCH_BASE_SEED") {
            self.base_seed = parse_env_value(&val, "PRBENCH_BASE_SEED")?;
        }

        if let Some(val) = lookup("PRBENCH_NUM_SEEDS") {
            self.num_seeds = parse_env_value(&val, "PRBENCH_NUM_SEEDS")?;
        }

        if let Some(val) = lookup("PRBENCH_MANIFEST") {
            self.manifest = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("PRBENCH_TRAJECTORY_DIR") {
            self.trajectory_dir = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("PRBENCH_REPORT_DIR") {
            self.report_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("PRBENCH_LOG_LEVEL") {
            self.log_level = val;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_workers == 0 {
            return Err(ConfigError::ValidationFailed(
                "num_workers must be greater than 0".to_string(),
            ));
        }

        if self.step_budget == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "step_budget must be greater than 0".to_string(),
            ));
        }

        if self.wall_clock_limit_ms == Some(0) || self.episode_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed(
                "time limits must be greater than 0".to_string(),
            ));
        }

        if self.num_seeds == 0 {
            return Err(ConfigError::ValidationFailed(
                "num_seeds must be greater than 0".to_string(),
            ));
        }

        if self.base_seed.checked_add(self.num_seeds).is_none() {
            return Err(ConfigError::ValidationFailed(
                "seed range overflows u64".to_string(),
            ));
        }

        self.weighting
            .validate()
            .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;

        if self.log_level.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "log_level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn seeds(&self) -> Vec<u64> {
        (self.base_seed..self.base_seed.saturating_add(self.num_seeds)).collect()
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            step_budget: self.step_budget,
            wall_clock_limit: self.wall_clock_limit_ms.map(Duration::from_millis),
            confidence: self.confidence,
            weighting: self.weighting,
        }
    }

    pub fn run_config_for(&self, spec: &TaskSpec) -> RunConfig {
        self.evaluation_options().run_config_for(spec)
    }

    /// Built-in tasks plus the manifest's variants, if a manifest is configured.
    pub fn build_registry(&self) -> Result<BenchmarkRegistry, RegistryError> {
        let mut registry = builtin_registry()?;
        if let Some(path) = &self.manifest {
            SuiteManifest::from_file(path)?.register_into(&mut registry)?;
        }
        Ok(registry)
    }

    /// Installs the tracing subscriber at `log_level`; `RUST_LOG` still wins.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        telemetry::init_tracing(&self.log_level)
    }

    /// Storage under `trajectory_dir`, or `None` when trajectories are not kept.
    pub fn trajectory_storage(&self) -> Option<TrajectoryStorage> {
        self.trajectory_dir.as_ref().map(TrajectoryStorage::new)
    }

    pub fn report_exporter(&self) -> ReportExporter {
        ReportExporter::new(&self.report_dir)
    }

    pub fn pool_config(&self) -> PoolConfig {
        let config = PoolConfig::new(self.num_workers);
        match self.episode_timeout_ms {
            Some(ms) => config.with_episode_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

/// Parse an environment variable value into the desired type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyTier;
    use crate::runner::{Agent, NoopAgent};
    use std::collections::HashMap;

    fn noop() -> Box<dyn Agent> {
        Box::new(NoopAgent::new())
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.confidence, ConfidenceLevel::P95);
        assert_eq!(config.weighting, WeightingScheme::Unweighted);
        assert_eq!(config.seeds().len(), 20);
        config.validate().expect("defaults should validate");
    }

    #[test]
    fn test_yaml_partial() {
        let yaml = "num_workers: 8\nstep_budget: 50\nconfidence: \"99\"\nweighting:\n  scheme: tier_weighted\n  easy: 1.0\n  medium: 1.0\n  hard: 4.0\n";
        let config = BenchmarkConfig::from_yaml(yaml).expect("yaml should parse");
        assert_eq!(config.num_workers, 8);
        assert_eq!(config.step_budget, Some(50));
        assert_eq!(config.confidence, ConfidenceLevel::P99);
        assert_eq!(config.weighting.weight(DifficultyTier::Hard), 4.0);
        assert_eq!(config.report_dir, PathBuf::from("./reports"));
    }

    #[test]
    fn test_env_overrides() {
        let config = BenchmarkConfig::default()
            .with_env_overrides(lookup(&[
                ("PRBENCH_NUM_WORKERS", "2"),
                ("PRBENCH_WALL_CLOCK_MS", "1500"),
                ("PRBENCH_WEIGHTING", "tier"),
                ("PRBENCH_BASE_SEED", "100"),
                ("PRBENCH_NUM_SEEDS", "3"),
            ]))
            .expect("overrides should apply");
        assert_eq!(config.num_workers, 2);
        assert_eq!(config.seeds(), vec![100, 101, 102]);
        assert_eq!(config.weighting, WeightingScheme::tier_defaults());

        let spec = TaskSpec::new("demo", DifficultyTier::Easy);
        let run = config.run_config_for(&spec);
        assert_eq!(run.step_budget, 100);
        assert_eq!(run.wall_clock_limit, Some(Duration::from_millis(1500)));
        assert_eq!(config.pool_config().num_workers, 2);
    }

    #[test]
    fn test_build_registry_with_manifest() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("suite.yaml");
        std::fs::write(
            &path,
            "name: extra\ntasks:\n  - id: push-long\n    kind: push_to_target\n    step_budget: 200\n",
        )
        .expect("write should succeed");

        let builtin = BenchmarkConfig::default().build_registry().expect("registry should build");
        let config = BenchmarkConfig {
            manifest: Some(path),
            ..BenchmarkConfig::default()
        };
        let registry = config.build_registry().expect("registry should build");
        assert_eq!(registry.len(), builtin.len() + 1);
        assert_eq!(registry.spec("push-long").expect("spec exists").default_step_budget, 200);
    }

    #[tokio::test]
    async fn test_output_locations() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let config = BenchmarkConfig::default()
            .with_env_overrides(lookup(&[
                ("PRBENCH_REPORT_DIR", temp_dir.path().join("reports").to_str().expect("utf-8 path")),
                ("PRBENCH_LOG_LEVEL", "debug"),
            ]))
            .expect("overrides should apply");
        assert!(config.trajectory_storage().is_none());
        config.init_tracing().expect("tracing should initialize");

        let registry = config.build_registry().expect("registry should build");
        let (report, trajectories) = registry
            .evaluate_recorded("push-to-target", &noop, &config.seeds()[..2], &config.evaluation_options())
            .expect("evaluate should succeed");

        let path = config
            .report_exporter()
            .export_report(&report)
            .await
            .expect("export should succeed");
        assert_eq!(path, temp_dir.path().join("reports").join("push-to-target.json"));

        let config = BenchmarkConfig {
            trajectory_dir: Some(temp_dir.path().join("trajectories")),
            ..config
        };
        let storage = config.trajectory_storage().expect("storage configured");
        assert_eq!(storage.base_path(), temp_dir.path().join("trajectories"));
        storage.save_all(&trajectories).await.expect("save should succeed");
        assert_eq!(storage.list().await.expect("list should succeed").len(), 2);
    }

    #[test]
    fn test_invalid_env_values() {
        let err = BenchmarkConfig::default()
            .with_env_overrides(lookup(&[("PRBENCH_NUM_WORKERS", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = BenchmarkConfig::default()
            .with_env_overrides(lookup(&[("PRBENCH_NUM_WORKERS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed(_)));

        let err = BenchmarkConfig::default()
            .with_env_overrides(lookup(&[("PRBENCH_CONFIDENCE", "80")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
