//! Task model - the unit of scheduled work.

use serde::{Deserialize, Serialize};
use crate::id::{ProjectId, TaskId, UserId};
use crate::Time;

/// Complexity assumed for tasks that were never scored.
pub const DEFAULT_COMPLEXITY: f64 = 3.0;

/// A scheduled piece of work inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Owning project
    pub project_id: ProjectId,

    /// Task title
    pub title: String,

    /// Completion flag
    #[serde(default)]
    pub is_completed: bool,

    /// Due date
    pub due_date: Time,

    /// Complexity score (advisory range 1-5)
    #[serde(default)]
    pub complexity: Option<f64>,

    /// Assigned users
    #[serde(default)]
    pub assignees: Vec<UserId>,

    /// Last update timestamp
    pub updated_at: Time,
}

impl Task {
    /// Create an open, unassigned task.
    pub fn new(project_id: ProjectId, title: impl Into<String>, due_date: Time) -> Self {
        Self {
            id: TaskId::new(),
            project_id,
            title: title.into(),
            is_completed: false,
            due_date,
            complexity: None,
            assignees: Vec::new(),
            updated_at: chrono::Utc::now(),
        }
    }

    /// Set completion flag.
    pub fn completed(mut self, done: bool) -> Self {
        self.is_completed = done;
        self
    }

    /// Set complexity score.
    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = Some(complexity);
        self
    }

    /// Assign a user (no duplicates).
    pub fn assigned_to(mut self, user: UserId) -> Self {
        self.assign(user);
        self
    }

    /// Add an assignee, keeping set semantics.
    pub fn assign(&mut self, user: UserId) {
        if !self.assignees.contains(&user) {
            self.assignees.push(user);
        }
    }

    /// Complexity, falling back to [`DEFAULT_COMPLEXITY`].
    pub fn effective_complexity(&self) -> f64 {
        self.complexity.unwrap_or(DEFAULT_COMPLEXITY)
    }

    /// Incomplete and past its due date.
    pub fn is_overdue(&self, now: Time) -> bool {
        !self.is_completed && self.due_date < now
    }

    /// Whether the task has any assignee.
    pub fn is_assigned(&self) -> bool {
        !self.assignees.is_empty()
    }
}

/// Filter for querying tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks of this project
    pub project_id: Option<ProjectId>,

    /// Only tasks with this completion flag
    pub is_completed: Option<bool>,
}

impl TaskFilter {
    /// All tasks of a project.
    pub fn for_project(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Default::default()
        }
    }

    /// Whether a task passes this filter.
    pub fn matches(&self, task: &Task) -> bool {
        self.project_id.map_or(true, |p| task.project_id == p)
            && self.is_completed.map_or(true, |c| task.is_completed == c)
    }
}
