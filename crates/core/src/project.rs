//! Project model - schedule window and team.

use serde::{Deserialize, Serialize};
use crate::id::{ProjectId, UserId};
use crate::Time;

/// A project with a planned delivery window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: ProjectId,

    /// Project name
    pub name: String,

    /// Planned start
    pub start: Time,

    /// Planned end (callers guarantee `end > start`)
    pub end: Time,

    /// Collaborators and their roles
    #[serde(default)]
    pub members: Vec<Collaborator>,
}

impl Project {
    /// Create a project with no members.
    pub fn new(name: impl Into<String>, start: Time, end: Time) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            start,
            end,
            members: Vec::new(),
        }
    }

    /// Add a collaborator.
    pub fn with_member(mut self, user_id: UserId, role: ProjectRole) -> Self {
        self.members.push(Collaborator { user_id, role });
        self
    }

    /// Role of a user in this project, if they are a member.
    pub fn role_of(&self, user_id: UserId) -> Option<ProjectRole> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .map(|m| m.role)
    }

    /// Whether the user leads this project.
    pub fn is_leader(&self, user_id: UserId) -> bool {
        self.role_of(user_id) == Some(ProjectRole::Leader)
    }
}

/// A user taking part in a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// The user
    pub user_id: UserId,

    /// Role within the project
    pub role: ProjectRole,
}

/// Role of a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    /// Regular member
    Member,
    /// Project owner, allowed to apply suggestions
    Leader,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_leader_lookup() {
        let leader = UserId::new();
        let member = UserId::new();
        let start = Utc::now();
        let project = Project::new("Apollo", start, start + Duration::days(30))
            .with_member(leader, ProjectRole::Leader)
            .with_member(member, ProjectRole::Member);

        assert!(project.is_leader(leader));
        assert!(!project.is_leader(member));
        assert!(!project.is_leader(UserId::new()));
        assert_eq!(project.role_of(member), Some(ProjectRole::Member));
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&ProjectRole::Leader).unwrap();
        assert_eq!(json, "\"leader\"");
    }
}
