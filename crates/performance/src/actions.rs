//! Remediation actions.
//!
//! Each action is a command over in-memory tasks: it mutates the slice it
//! is given and reports what changed. Persisting the changed tasks is the
//! caller's job (see [`crate::PerformanceService`]).

use chrono::Duration;
use planwise_core::{ActionCode, Project, Task, TaskId, Time, UserId};
use serde::Serialize;
use tracing::debug;

use crate::config::ActionConfig;
use crate::metrics::MetricsCalculator;
use crate::workload::WorkloadSnapshot;

/// Minimum deadline extension proposed by `revise_goals`.
const MIN_GOAL_EXTENSION_DAYS: i64 = 7;

/// A due date moved by an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueDateChange {
    /// The task
    pub task_id: TaskId,
    /// Previous due date
    pub from: Time,
    /// New due date
    pub to: Time,
}

/// An assignee added by an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    /// The task
    pub task_id: TaskId,
    /// The new assignee
    pub user_id: UserId,
}

/// What an action did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionDetail {
    /// Due dates were moved
    Rescheduled {
        /// One entry per moved task
        changes: Vec<DueDateChange>,
    },
    /// Unassigned tasks got an assignee
    Assigned {
        /// One entry per assigned task
        assignments: Vec<Assignment>,
    },
    /// Advisory: suggested deadline extension
    GoalRevision {
        /// Days to extend the project by
        suggested_extension_days: i64,
    },
    /// Advisory: open tasks close to their deadline
    CriticalTasks {
        /// Size of the look-ahead window
        due_within_days: i64,
        /// Open tasks due inside the window (overdue included)
        count: usize,
    },
    /// Nothing to do
    Acknowledged,
}

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    /// The applied action
    pub action: ActionCode,
    /// Number of tasks changed
    pub affected: usize,
    /// Human-readable summary
    pub summary: String,
    /// Structured detail
    pub detail: ActionDetail,
}

impl ActionOutcome {
    /// Ids of the tasks this outcome changed.
    pub fn changed_tasks(&self) -> Vec<TaskId> {
        match &self.detail {
            ActionDetail::Rescheduled { changes } => changes.iter().map(|c| c.task_id).collect(),
            ActionDetail::Assigned { assignments } => {
                assignments.iter().map(|a| a.task_id).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Applies [`ActionCode`]s to a project's tasks.
#[derive(Debug, Clone, Default)]
pub struct ActionApplier {
    config: ActionConfig,
}

impl ActionApplier {
    /// Create an applier with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the action parameters.
    pub fn with_config(mut self, config: ActionConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply `action` to `tasks` as of `now`.
    pub fn apply(&self, action: ActionCode, project: &Project, tasks: &mut [Task], now: Time) -> ActionOutcome {
        let outcome = match action {
            ActionCode::PrioritizeOverdue => self.prioritize_overdue(tasks, now),
            ActionCode::BalanceWorkload => self.balance_workload(project, tasks, now),
            ActionCode::AdjustDeadlines => self.adjust_deadlines(project, tasks, now),
            ActionCode::ReviseGoals => self.revise_goals(project, tasks, now),
            ActionCode::AccelerateCompletion => self.accelerate_completion(tasks, now),
            ActionCode::MaintainPace => ActionOutcome {
                action,
                affected: 0,
                summary: "Project is on track, keep the current pace".to_string(),
                detail: ActionDetail::Acknowledged,
            },
        };
        debug!("Applied {} to {}: {} affected", action, project.id, outcome.affected);
        outcome
    }

    fn prioritize_overdue(&self, tasks: &mut [Task], now: Time) -> ActionOutcome {
        let mut overdue: Vec<usize> = (0..tasks.len()).filter(|&i| tasks[i].is_overdue(now)).collect();
        overdue.sort_by(|&a, &b| {
            tasks[a].due_date.cmp(&tasks[b].due_date).then_with(|| {
                tasks[b]
                    .effective_complexity()
                    .total_cmp(&tasks[a].effective_complexity())
            })
        });

        let mut changes = Vec::with_capacity(overdue.len());
        for (slot, &i) in overdue.iter().enumerate() {
            let task = &mut tasks[i];
            let to = now + Duration::days(1 + slot as i64 * self.config.stagger_days);
            changes.push(DueDateChange { task_id: task.id, from: task.due_date, to });
            task.due_date = to;
            task.updated_at = now;
        }

        ActionOutcome {
            action: ActionCode::PrioritizeOverdue,
            affected: changes.len(),
            summary: format!("Rescheduled {} overdue tasks", changes.len()),
            detail: ActionDetail::Rescheduled { changes },
        }
    }

    fn balance_workload(&self, project: &Project, tasks: &mut [Task], now: Time) -> ActionOutcome {
        let mut members = WorkloadSnapshot::from_tasks(&project.members, tasks).members;
        // Stable: equal loads keep membership order.
        members.sort_by_key(|m| m.pending);

        let mut unassigned: Vec<usize> = (0..tasks.len())
            .filter(|&i| !tasks[i].is_completed && !tasks[i].is_assigned())
            .collect();
        unassigned.sort_by_key(|&i| tasks[i].due_date);

        let mut assignments = Vec::new();
        if !members.is_empty() {
            for (slot, &i) in unassigned.iter().enumerate() {
                let user_id = members[slot % members.len()].user_id;
                let task = &mut tasks[i];
                task.assign(user_id);
                task.updated_at = now;
                assignments.push(Assignment { task_id: task.id, user_id });
            }
        }

        ActionOutcome {
            action: ActionCode::BalanceWorkload,
            affected: assignments.len(),
            summary: format!(
                "Assigned {} tasks across {} members",
                assignments.len(),
                members.len()
            ),
            detail: ActionDetail::Assigned { assignments },
        }
    }

    fn adjust_deadlines(&self, project: &Project, tasks: &mut [Task], now: Time) -> ActionOutcome {
        let window_end = now + Duration::days(self.config.deadline_window_days);
        let extension = Duration::days(self.config.deadline_extension_days);

        let mut changes = Vec::new();
        for task in tasks.iter_mut() {
            if task.is_completed || task.due_date < now || task.due_date > window_end {
                continue;
            }
            let to = (task.due_date + extension).min(project.end);
            if to <= task.due_date {
                continue;
            }
            changes.push(DueDateChange { task_id: task.id, from: task.due_date, to });
            task.due_date = to;
            task.updated_at = now;
        }

        ActionOutcome {
            action: ActionCode::AdjustDeadlines,
            affected: changes.len(),
            summary: format!("Extended {} near deadlines", changes.len()),
            detail: ActionDetail::Rescheduled { changes },
        }
    }

    fn revise_goals(&self, project: &Project, tasks: &[Task], now: Time) -> ActionOutcome {
        let tcpi = MetricsCalculator::new()
            .compute(project, tasks, now)
            .map_or(1.0, |m| m.tcpi);
        let days = (((tcpi - 1.0) * 10.0).floor() as i64).max(MIN_GOAL_EXTENSION_DAYS);

        ActionOutcome {
            action: ActionCode::ReviseGoals,
            affected: 0,
            summary: format!("Consider extending the deadline by {days} days or reducing scope"),
            detail: ActionDetail::GoalRevision { suggested_extension_days: days },
        }
    }

    fn accelerate_completion(&self, tasks: &[Task], now: Time) -> ActionOutcome {
        let within = self.config.deadline_window_days;
        let horizon = now + Duration::days(within);
        let count = tasks
            .iter()
            .filter(|t| !t.is_completed && t.due_date <= horizon)
            .count();

        ActionOutcome {
            action: ActionCode::AccelerateCompletion,
            affected: 0,
            summary: format!("{count} critical tasks due within {within} days"),
            detail: ActionDetail::CriticalTasks { due_within_days: within, count },
        }
    }
}
