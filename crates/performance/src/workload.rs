//! Team workload snapshot.

use planwise_core::{Collaborator, Task, UserId};
use serde::Serialize;

/// Pending task count of one collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemberLoad {
    /// The collaborator
    pub user_id: UserId,
    /// Open tasks assigned to them
    pub pending: usize,
}

/// Spread between the most and least loaded members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkloadImbalance {
    /// Highest pending count
    pub max: usize,
    /// Lowest pending count
    pub min: usize,
    /// `max - min`
    pub spread: usize,
    /// Members compared
    pub members: usize,
}

/// Pending tasks per collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkloadSnapshot {
    /// One entry per collaborator, in membership order
    pub members: Vec<MemberLoad>,
}

impl WorkloadSnapshot {
    /// Snapshot from precomputed loads.
    pub fn new(members: Vec<MemberLoad>) -> Self {
        Self { members }
    }

    /// Count each collaborator's open assigned tasks.
    pub fn from_tasks(collaborators: &[Collaborator], tasks: &[Task]) -> Self {
        let members = collaborators
            .iter()
            .map(|c| MemberLoad {
                user_id: c.user_id,
                pending: tasks
                    .iter()
                    .filter(|t| !t.is_completed && t.assignees.contains(&c.user_id))
                    .count(),
            })
            .collect();
        Self { members }
    }

    /// Whether there is no team data.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Imbalance across members when the spread exceeds `threshold`.
    /// Needs at least two members.
    pub fn imbalance(&self, threshold: usize) -> Option<WorkloadImbalance> {
        if self.members.len() < 2 {
            return None;
        }
        let max = self.members.iter().map(|m| m.pending).max()?;
        let min = self.members.iter().map(|m| m.pending).min()?;
        let spread = max - min;

        (spread > threshold).then_some(WorkloadImbalance {
            max,
            min,
            spread,
            members: self.members.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use planwise_core::{ProjectId, ProjectRole};

    fn loads(values: &[usize]) -> WorkloadSnapshot {
        WorkloadSnapshot::new(
            values
                .iter()
                .map(|&pending| MemberLoad { user_id: UserId::new(), pending })
                .collect(),
        )
    }

    #[test]
    fn test_imbalance_fires_above_threshold() {
        let imbalance = loads(&[1, 1, 1, 8]).imbalance(3).unwrap();
        assert_eq!(imbalance.max, 8);
        assert_eq!(imbalance.min, 1);
        assert_eq!(imbalance.spread, 7);
        assert_eq!(imbalance.members, 4);
    }

    #[test]
    fn test_spread_equal_to_threshold_is_balanced() {
        assert!(loads(&[2, 5]).imbalance(3).is_none());
    }

    #[test]
    fn test_single_member_never_unbalanced() {
        assert!(loads(&[12]).imbalance(3).is_none());
        assert!(loads(&[]).imbalance(3).is_none());
    }

    #[test]
    fn test_from_tasks_counts_open_assigned_tasks() {
        let project = ProjectId::new();
        let a = UserId::new();
        let b = UserId::new();
        let due = Utc::now() + Duration::days(3);
        let collaborators = [
            Collaborator { user_id: a, role: ProjectRole::Leader },
            Collaborator { user_id: b, role: ProjectRole::Member },
        ];
        let tasks = vec![
            Task::new(project, "1", due).assigned_to(a),
            Task::new(project, "2", due).assigned_to(a).assigned_to(b),
            Task::new(project, "3", due).assigned_to(a).completed(true),
            Task::new(project, "4", due),
        ];

        let snapshot = WorkloadSnapshot::from_tasks(&collaborators, &tasks);
        assert_eq!(snapshot.members[0], MemberLoad { user_id: a, pending: 2 });
        assert_eq!(snapshot.members[1], MemberLoad { user_id: b, pending: 1 });
    }
}
