//! Import bundle: a project and its tasks in one JSON document.

use planwise_core::{Project, ProjectRole, Task, Time, UserId};
use serde::Deserialize;

/// Top-level import document.
#[derive(Debug, Deserialize)]
pub struct ImportBundle {
    pub project: ProjectEntry,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub start: Time,
    pub end: Time,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MemberEntry {
    pub user_id: UserId,
    #[serde(default = "default_role")]
    pub role: ProjectRole,
}

fn default_role() -> ProjectRole {
    ProjectRole::Member
}

#[derive(Debug, Deserialize)]
pub struct TaskEntry {
    pub title: String,
    pub due_date: Time,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub complexity: Option<f64>,
    #[serde(default)]
    pub assignees: Vec<UserId>,
}

impl ImportBundle {
    /// Build the models with fresh ids.
    pub fn into_models(self) -> anyhow::Result<(Project, Vec<Task>)> {
        let ProjectEntry { name, start, end, members } = self.project;
        if end <= start {
            anyhow::bail!("project end must be after its start");
        }

        let project = members
            .into_iter()
            .fold(Project::new(name, start, end), |p, m| p.with_member(m.user_id, m.role));

        let tasks = self
            .tasks
            .into_iter()
            .map(|entry| {
                let mut task = Task::new(project.id, entry.title, entry.due_date)
                    .completed(entry.is_completed);
                task.complexity = entry.complexity;
                for user in entry.assignees {
                    task.assign(user);
                }
                task
            })
            .collect();

        Ok((project, tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "project": {
            "name": "Website relaunch",
            "start": "2026-01-01T00:00:00Z",
            "end": "2026-03-02T00:00:00Z",
            "members": [
                {"user_id": "01HZX3K8Q9V2M4N6P8R0S2T4V6", "role": "leader"},
                {"user_id": "01HZX3K8Q9V2M4N6P8R0S2T4V7"}
            ]
        },
        "tasks": [
            {"title": "Wireframes", "due_date": "2026-01-15T00:00:00Z", "is_completed": true},
            {"title": "Build", "due_date": "2026-02-20T00:00:00Z", "complexity": 5,
             "assignees": ["01HZX3K8Q9V2M4N6P8R0S2T4V7", "01HZX3K8Q9V2M4N6P8R0S2T4V7"]}
        ]
    }"#;

    #[test]
    fn test_bundle_into_models() {
        let bundle: ImportBundle = serde_json::from_str(BUNDLE).unwrap();
        let (project, tasks) = bundle.into_models().unwrap();

        assert_eq!(project.name, "Website relaunch");
        assert_eq!(project.members.len(), 2);
        assert_eq!(project.members[1].role, ProjectRole::Member);
        assert!(project.is_leader("01HZX3K8Q9V2M4N6P8R0S2T4V6".parse().unwrap()));

        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.project_id == project.id));
        assert!(tasks[0].is_completed);
        assert_eq!(tasks[1].complexity, Some(5.0));
        assert_eq!(tasks[1].assignees.len(), 1);
    }

    #[test]
    fn test_bundle_rejects_inverted_window() {
        let bundle: ImportBundle = serde_json::from_str(
            r#"{"project": {"name": "x", "start": "2026-02-01T00:00:00Z", "end": "2026-01-01T00:00:00Z"}}"#,
        )
        .unwrap();
        assert!(bundle.into_models().is_err());
    }
}
