//! Storage trait abstraction.

use async_trait::async_trait;
use planwise_core::{
    AnalysisRecord, AppliedAction, Collaborator, Project, ProjectId, Task, TaskFilter, TaskId,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored record could not be read back
    #[error("Corrupt record {0}")]
    Corrupt(String),
}

/// Storage abstraction for Planwise data.
///
/// Writers must be serialized per project by the caller; implementations do
/// not lock.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Project operations ===

    /// Save a project (create or update).
    async fn save_project(&mut self, project: &Project) -> Result<()>;

    /// Load a project by ID.
    async fn load_project(&self, id: ProjectId) -> Result<Option<Project>>;

    /// Collaborators of a project. Empty when the project does not exist.
    async fn list_collaborators(&self, project_id: ProjectId) -> Result<Vec<Collaborator>> {
        Ok(self
            .load_project(project_id)
            .await?
            .map(|p| p.members)
            .unwrap_or_default())
    }

    // === Task operations ===

    /// Save a task (create or update).
    async fn save_task(&mut self, task: &Task) -> Result<()>;

    /// Load a task by ID.
    async fn load_task(&self, id: TaskId) -> Result<Option<Task>>;

    /// List tasks matching the filter.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    // === Analysis history ===

    /// Append an analysis record to its project's history.
    async fn append_analysis(&mut self, record: &AnalysisRecord) -> Result<()>;

    /// Analysis history of a project, oldest first.
    async fn list_analyses(&self, project_id: ProjectId) -> Result<Vec<AnalysisRecord>>;

    /// Attach an applied action to the latest analysis of a project.
    ///
    /// Returns `false` when the project has no analysis yet.
    async fn record_applied_action(
        &mut self,
        project_id: ProjectId,
        action: &AppliedAction,
    ) -> Result<bool>;

    // === Transaction support ===

    /// Commit pending changes with a message.
    async fn commit(&mut self, message: &str) -> Result<()>;

    /// Rollback pending changes.
    async fn rollback(&mut self) -> Result<()>;
}
