//! JSON file storage implementation.
//!
//! Stores data as JSON files under a root directory (`.planwise` by default)
//! and keeps small per-object meta markers (version + updated_at). Every
//! overwrite since the last commit is journaled so `rollback` can restore
//! the previous file contents.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use planwise_core::{
    AnalysisRecord, AppliedAction, Project, ProjectId, Task, TaskFilter, TaskId,
};
use super::{Storage, StorageError, Result};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Previous content of a file touched since the last commit.
type JournalEntry = (PathBuf, Option<Vec<u8>>);

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    journal: Arc<Mutex<Vec<JournalEntry>>>,
}

impl JsonStorage {
    /// Create storage, creating the subdirectories needed for data and meta
    /// markers.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("projects")).await?;
        fs::create_dir_all(root.join("tasks")).await?;
        fs::create_dir_all(root.join("analyses")).await?;

        fs::create_dir_all(root.join("meta").join("projects")).await?;
        fs::create_dir_all(root.join("meta").join("tasks")).await?;

        Ok(Self {
            root,
            journal: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn project_path(&self, id: ProjectId) -> PathBuf {
        self.root.join("projects").join(format!("{}.json", id))
    }
    fn task_path(&self, id: TaskId) -> PathBuf {
        self.root.join("tasks").join(format!("{}.json", id))
    }
    fn analyses_path(&self, project_id: ProjectId) -> PathBuf {
        self.root.join("analyses").join(format!("{}.json", project_id))
    }

    fn meta_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join("meta").join(kind).join(format!("{}.meta.json", id))
    }

    /// Number of files changed since the last commit.
    pub async fn pending_changes(&self) -> usize {
        self.journal.lock().await.len()
    }

    /// Write a file, journaling its previous content on first touch.
    async fn write_tracked(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        {
            let mut journal = self.journal.lock().await;
            if !journal.iter().any(|(p, _)| p == path) {
                let previous = match fs::read(path).await {
                    Ok(b) => Some(b),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
                    Err(e) => return Err(e.into()),
                };
                journal.push((path.to_path_buf(), previous));
            }
        }
        fs::write(path, bytes).await?;
        Ok(())
    }

    /// Read and increment per-object version, return new version.
    async fn bump_version(&self, kind: &str, id: &str) -> Result<u64> {
        let path = self.meta_path(kind, id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        self.write_tracked(&path, serde_json::to_string_pretty(&meta)?.as_bytes())
            .await?;
        Ok(version)
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_project(&mut self, project: &Project) -> Result<()> {
        let path = self.project_path(project.id);
        let json = serde_json::to_string_pretty(project)?;
        self.write_tracked(&path, json.as_bytes()).await?;

        let ver = self.bump_version("projects", &project.id.to_string()).await?;
        debug!("Saved project {} (v{})", project.id, ver);
        Ok(())
    }

    async fn load_project(&self, id: ProjectId) -> Result<Option<Project>> {
        read_json(&self.project_path(id)).await
    }

    async fn save_task(&mut self, task: &Task) -> Result<()> {
        let path = self.task_path(task.id);
        let json = serde_json::to_string_pretty(task)?;
        self.write_tracked(&path, json.as_bytes()).await?;

        let ver = self.bump_version("tasks", &task.id.to_string()).await?;
        debug!("Saved task {} (v{})", task.id, ver);
        Ok(())
    }

    async fn load_task(&self, id: TaskId) -> Result<Option<Task>> {
        read_json(&self.task_path(id)).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let all: Vec<Task> = list_dir(&self.root.join("tasks")).await?;
        let mut tasks: Vec<Task> = all.into_iter().filter(|t| filter.matches(t)).collect();
        // Directory order is unspecified; keep listings stable.
        tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    async fn append_analysis(&mut self, record: &AnalysisRecord) -> Result<()> {
        let path = self.analyses_path(record.project_id);
        let mut history: Vec<AnalysisRecord> = read_json(&path).await?.unwrap_or_default();
        history.push(record.clone());
        let json = serde_json::to_string_pretty(&history)?;
        self.write_tracked(&path, json.as_bytes()).await
    }

    async fn list_analyses(&self, project_id: ProjectId) -> Result<Vec<AnalysisRecord>> {
        Ok(read_json(&self.analyses_path(project_id)).await?.unwrap_or_default())
    }

    async fn record_applied_action(
        &mut self,
        project_id: ProjectId,
        action: &AppliedAction,
    ) -> Result<bool> {
        let path = self.analyses_path(project_id);
        let mut history: Vec<AnalysisRecord> = read_json(&path).await?.unwrap_or_default();
        let Some(latest) = history.last_mut() else {
            return Ok(false);
        };
        latest.applied_actions.push(action.clone());
        let json = serde_json::to_string_pretty(&history)?;
        self.write_tracked(&path, json.as_bytes()).await?;
        Ok(true)
    }

    async fn commit(&mut self, message: &str) -> Result<()> {
        let mut journal = self.journal.lock().await;
        debug!("Commit '{}' ({} files)", message, journal.len());
        journal.clear();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        let mut journal = self.journal.lock().await;
        while let Some((path, previous)) = journal.pop() {
            match previous {
                Some(bytes) => fs::write(&path, bytes).await?,
                None => fs::remove_file(&path).await.or_else(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
                })?,
            }
        }
        Ok(())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        let path = entry.path();
        match read_json(&path).await {
            Ok(Some(item)) => items.push(item),
            // Removed between listing and reading.
            Ok(None) => {}
            Err(e) => {
                error!("Unreadable record {}: {}", path.display(), e);
                return Err(StorageError::Corrupt(format!("{}: {}", path.display(), e)));
            }
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use planwise_core::{
        ActionCode, AnalysisId, HealthStatus, ProjectRole, UserId,
    };

    fn sample_project() -> Project {
        let start = Utc::now();
        Project::new("Atlas", start, start + Duration::days(30))
            .with_member(UserId::new(), ProjectRole::Leader)
    }

    fn sample_record(project_id: ProjectId) -> AnalysisRecord {
        AnalysisRecord {
            id: AnalysisId::new(),
            project_id,
            status: HealthStatus::OnTrack,
            probability_of_delay: 10,
            suggestions: vec![],
            timestamp: Utc::now(),
            applied_actions: vec![],
        }
    }

    #[tokio::test]
    async fn test_project_and_collaborators() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let project = sample_project();

        storage.save_project(&project).await.unwrap();
        let loaded = storage.load_project(project.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Atlas");

        let members = storage.list_collaborators(project.id).await.unwrap();
        assert_eq!(members, project.members);
        assert!(storage.list_collaborators(ProjectId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tasks_filters_by_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let project = sample_project();
        let other = ProjectId::new();
        let now = Utc::now();

        storage.save_task(&Task::new(project.id, "b", now + Duration::days(2))).await.unwrap();
        storage.save_task(&Task::new(project.id, "a", now + Duration::days(1))).await.unwrap();
        storage.save_task(&Task::new(other, "x", now)).await.unwrap();

        let tasks = storage.list_tasks(&TaskFilter::for_project(project.id)).await.unwrap();
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_analysis_history_appends() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let project_id = ProjectId::new();

        let action = AppliedAction {
            action_code: ActionCode::MaintainPace,
            suggestion_id: None,
            applied_by: UserId::new(),
            affected: 0,
            summary: "ok".to_string(),
            timestamp: Utc::now(),
        };
        assert!(!storage.record_applied_action(project_id, &action).await.unwrap());

        storage.append_analysis(&sample_record(project_id)).await.unwrap();
        storage.append_analysis(&sample_record(project_id)).await.unwrap();
        assert!(storage.record_applied_action(project_id, &action).await.unwrap());

        let history = storage.list_analyses(project_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].applied_actions.is_empty());
        assert_eq!(history[1].applied_actions, vec![action]);
    }

    #[tokio::test]
    async fn test_rollback_restores_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let now = Utc::now();
        let original = Task::new(ProjectId::new(), "keep", now);
        storage.save_task(&original).await.unwrap();
        storage.commit("seed").await.unwrap();
        assert_eq!(storage.pending_changes().await, 0);

        let mut changed = original.clone();
        changed.due_date = now + Duration::days(7);
        storage.save_task(&changed).await.unwrap();
        let fresh = Task::new(ProjectId::new(), "new", now);
        storage.save_task(&fresh).await.unwrap();
        assert!(storage.pending_changes().await > 0);

        storage.rollback().await.unwrap();

        let restored = storage.load_task(original.id).await.unwrap().unwrap();
        assert_eq!(restored.due_date, original.due_date);
        assert!(storage.load_task(fresh.id).await.unwrap().is_none());
        assert_eq!(storage.pending_changes().await, 0);
    }

    #[tokio::test]
    async fn test_unreadable_task_fails_listing() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();
        let project_id = ProjectId::new();
        let good = Task::new(project_id, "good", Utc::now());
        let bad = Task::new(project_id, "bad", Utc::now());
        storage.save_task(&good).await.unwrap();
        storage.save_task(&bad).await.unwrap();
        storage.commit("seed").await.unwrap();

        let path = dir.path().join("tasks").join(format!("{}.json", bad.id));
        let json = fs::read_to_string(&path).await.unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["due_date"] = serde_json::Value::from("not a date");
        fs::write(&path, serde_json::to_string(&value).unwrap()).await.unwrap();

        let err = storage
            .list_tasks(&TaskFilter::for_project(project_id))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(ref msg) if msg.contains(&bad.id.to_string())));
    }
}
