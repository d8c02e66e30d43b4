//! File-based trajectory storage.
//!
//! One pretty-printed JSON file per trajectory, named `<uuid>.json`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use super::types::Trajectory;

/// Errors that can occur during trajectory storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Trajectory not found: {0}")]
    NotFound(Uuid),

    #[error("Failed to create storage directory: {0}")]
    DirectoryCreationFailed(String),

    /// The file parsed but does not hold the trajectory its name claims.
    #[error("Invalid trajectory data: {0}")]
    InvalidData(String),
}

/// Local directory of trajectory files.
pub struct TrajectoryStorage {
    base_path: PathBuf,
}

impl TrajectoryStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn trajectory_path(&self, id: &Uuid) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }

    async fn ensure_directory(&self) -> Result<(), StorageError> {
        if !fs::try_exists(&self.base_path).await? {
            fs::create_dir_all(&self.base_path).await.map_err(|e| {
                StorageError::DirectoryCreationFailed(format!("{}: {}", self.base_path.display(), e))
            })?;
        }
        Ok(())
    }

    /// Writes a trajectory and returns its path.
    pub async fn save(&self, trajectory: &Trajectory) -> Result<PathBuf, StorageError> {
        self.ensure_directory().await?;
        let path = self.trajectory_path(&trajectory.id());
        let json = serde_json::to_string_pretty(trajectory)?;

        let mut file = fs::File::create(&path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;

        debug!(
            trajectory_id = %trajectory.id(),
            task_id = %trajectory.task_id(),
            steps = trajectory.len(),
            "Saved trajectory"
        );
        Ok(path)
    }

    pub async fn save_all(&self, trajectories: &[Trajectory]) -> Result<Vec<PathBuf>, StorageError> {
        let mut paths = Vec::with_capacity(trajectories.len());
        for trajectory in trajectories {
            paths.push(self.save(trajectory).await?);
        }
        Ok(paths)
    }

    pub async fn load(&self, id: &Uuid) -> Result<Trajectory, StorageError> {
        let path = self.trajectory_path(id);
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(*id));
        }

        let contents = fs::read_to_string(&path).await?;
        let trajectory: Trajectory = serde_json::from_str(&contents)?;
        if trajectory.id() != *id {
            return Err(StorageError::InvalidData(format!(
                "file {} holds trajectory {}",
                path.display(),
                trajectory.id()
            )));
        }
        Ok(trajectory)
    }

    /// Ids of all stored trajectories, sorted.
    pub async fn list(&self) -> Result<Vec<Uuid>, StorageError> {
        self.ensure_directory().await?;

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Loads every stored trajectory for `task_id`, ordered by seed.
    pub async fn load_task(&self, task_id: &str) -> Result<Vec<Trajectory>, StorageError> {
        let mut found = Vec::new();
        for id in self.list().await? {
            let trajectory = self.load(&id).await?;
            if trajectory.task_id() == task_id {
                found.push(trajectory);
            }
        }
        found.sort_by_key(|t| (t.seed(), t.id()));
        Ok(found)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), StorageError> {
        let path = self.trajectory_path(id);
        if !fs::try_exists(&path).await? {
            return Err(StorageError::NotFound(*id));
        }
        fs::remove_file(&path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{EpisodeRunner, NoopAgent, RunConfig};
    use crate::generator::InstanceGenerator;
    use crate::tasks::PushToTarget;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn recorded(seed: u64) -> Trajectory {
        let task = Arc::new(PushToTarget::new());
        let instance = InstanceGenerator::new()
            .generate(task.as_ref(), seed)
            .expect("generation should succeed");
        let runner = EpisodeRunner::new(task, RunConfig::new(5));
        runner.run(&instance, &mut NoopAgent::new()).trajectory
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = TrajectoryStorage::new(temp_dir.path());
        let trajectory = recorded(1);

        let path = storage.save(&trajectory).await.expect("Save should succeed");
        assert!(path.exists());
        let loaded = storage.load(&trajectory.id()).await.expect("Load should succeed");
        assert_eq!(loaded, trajectory);
    }

    #[tokio::test]
    async fn test_load_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = TrajectoryStorage::new(temp_dir.path());
        let result = storage.load(&Uuid::new_v4()).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_and_load_task() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = TrajectoryStorage::new(temp_dir.path().join("nested"));
        let trajectories: Vec<_> = [3, 1, 2].into_iter().map(recorded).collect();
        storage.save_all(&trajectories).await.expect("Save should succeed");

        assert_eq!(storage.list().await.expect("List should succeed").len(), 3);
        let loaded = storage.load_task("push-to-target").await.expect("Load should succeed");
        let seeds: Vec<u64> = loaded.iter().map(|t| t.seed()).collect();
        assert_eq!(seeds, vec![1, 2, 3]);
        assert!(storage.load_task("other").await.expect("Load should succeed").is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = TrajectoryStorage::new(temp_dir.path());
        let trajectory = recorded(4);
        storage.save(&trajectory).await.expect("Save should succeed");
        storage.delete(&trajectory.id()).await.expect("Delete should succeed");
        assert!(matches!(
            storage.delete(&trajectory.id()).await,
            Err(StorageError::NotFound(_))
        ));
    }
}
