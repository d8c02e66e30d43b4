//! Report export.
//!
//! Reports serialize to pretty JSON documents or to JSON-lines files of flat
//! [`ReportRecord`]s, one per task plus a suite summary.

pub mod records;

pub use records::{suite_records, ReportRecord, SuiteRecord, TaskRecord};

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::error::ExportError;
use crate::scoring::{BenchmarkReport, SuiteReport};

pub fn to_json<T: Serialize>(value: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One compact JSON object per line, each line newline-terminated.
pub fn to_jsonl(records: &[ReportRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Writes reports under one directory.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    output_dir: PathBuf,
    overwrite: bool,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite: false,
        }
    }

    /// Allows replacing existing files.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `<task_id>.json`.
    pub async fn export_report(&self, report: &BenchmarkReport) -> Result<PathBuf, ExportError> {
        let path = self.output_dir.join(format!("{}.json", report.task_id()));
        self.write(&path, to_json(report)?).await?;
        Ok(path)
    }

    /// Writes `<name>.json` with the full suite and `<name>.jsonl` with flat records.
    pub async fn export_suite(&self, suite: &SuiteReport, name: &str) -> Result<(PathBuf, PathBuf), ExportError> {
        let json_path = self.output_dir.join(format!("{}.json", name));
        let jsonl_path = self.output_dir.join(format!("{}.jsonl", name));
        let json = to_json(suite)?;
        let jsonl = to_jsonl(&suite_records(suite))?;

        self.write(&json_path, json).await?;
        self.write(&jsonl_path, jsonl).await?;

        info!(
            output_dir = %self.output_dir.display(),
            tasks = suite.tasks().len(),
            "Exported suite report"
        );
        Ok((json_path, jsonl_path))
    }

    async fn write(&self, path: &Path, contents: String) -> Result<(), ExportError> {
        if !self.overwrite && fs::try_exists(path).await? {
            return Err(ExportError::PathExists(path.display().to_string()));
        }
        fs::create_dir_all(&self.output_dir).await?;
        fs::write(path, contents).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyTier;
    use crate::runner::{EpisodeResult, TerminationReason};
    use crate::scoring::{ConfidenceLevel, TaskFailure, WeightingScheme};
    use tempfile::TempDir;

    fn report(task: &str) -> BenchmarkReport {
        let results = vec![
            EpisodeResult::aborted(task, 1, "noop", 100, TerminationReason::GoalReached),
            EpisodeResult::aborted(task, 2, "noop", 100, TerminationReason::StepBudgetExhausted),
        ];
        BenchmarkReport::from_results(DifficultyTier::Easy, &results, ConfidenceLevel::P95)
            .expect("aggregation should succeed")
    }

    fn suite() -> SuiteReport {
        SuiteReport::build(
            vec![report("b-task"), report("a-task")],
            vec![TaskFailure {
                task_id: "broken".into(),
                error: "bad layout".into(),
            }],
            WeightingScheme::Unweighted,
        )
        .expect("suite should build")
    }

    #[test]
    fn test_jsonl_records() {
        let text = to_jsonl(&suite_records(&suite())).expect("jsonl should serialize");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(first["record"], "task");
        assert_eq!(first["task_id"], "a-task");
        assert_eq!(first["success_rate"], 0.5);
        assert_eq!(first["seeds"], serde_json::json!([1, 2]));

        let last: ReportRecord = serde_json::from_str(lines[2]).expect("valid record");
        match last {
            ReportRecord::Suite(summary) => {
                assert_eq!(summary.failed_tasks, vec!["broken".to_string()]);
                assert_eq!(summary.total_episodes, 4);
            }
            other => panic!("expected suite record, got {:?}", other),
        }
        assert!(matches!(to_jsonl(&[]), Err(ExportError::Empty)));
    }

    #[tokio::test]
    async fn test_export_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let exporter = ReportExporter::new(temp_dir.path().join("reports"));

        let path = exporter.export_report(&report("a-task")).await.expect("export should succeed");
        let loaded: BenchmarkReport =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("file readable")).expect("valid report");
        assert_eq!(loaded.task_id(), "a-task");
        assert_eq!(loaded.episode_count(), 2);

        assert!(matches!(
            exporter.export_report(&report("a-task")).await,
            Err(ExportError::PathExists(_))
        ));
        exporter
            .clone()
            .with_overwrite(true)
            .export_report(&report("a-task"))
            .await
            .expect("overwrite should succeed");

        let (json, jsonl) = exporter.export_suite(&suite(), "suite").await.expect("export should succeed");
        assert!(json.exists() && jsonl.exists());
    }
}
