//! Analysis outputs - suggestions, health labels, and the history log.

use serde::{Deserialize, Serialize};
use crate::id::{AnalysisId, ProjectId, UserId};
use crate::Time;

/// Health label of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// Everything delivered
    Completed,
    /// Clearly ahead of plan
    Ahead,
    /// On plan
    OnTrack,
    /// Slipping, needs attention
    Attention,
    /// Noticeably behind
    ModerateDelay,
    /// Severely behind or overdue
    CriticalDelay,
}

impl HealthStatus {
    /// Wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Completed => "COMPLETED",
            HealthStatus::Ahead => "AHEAD",
            HealthStatus::OnTrack => "ON_TRACK",
            HealthStatus::Attention => "ATTENTION",
            HealthStatus::ModerateDelay => "MODERATE_DELAY",
            HealthStatus::CriticalDelay => "CRITICAL_DELAY",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity color shown next to a [`HealthStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealthColor {
    /// Completed or ahead
    Green,
    /// On track
    LightGreen,
    /// Needs attention
    Yellow,
    /// Moderate delay
    Orange,
    /// Critical delay
    Red,
}

impl HealthColor {
    /// Wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthColor::Green => "green",
            HealthColor::LightGreen => "light-green",
            HealthColor::Yellow => "yellow",
            HealthColor::Orange => "orange",
            HealthColor::Red => "red",
        }
    }
}

/// Suggestion priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Nice to have
    Low,
    /// Should be addressed soon
    Medium,
    /// Address first
    High,
}

impl Priority {
    /// Sort weight (high = 3, medium = 2, low = 1).
    pub fn weight(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    /// Wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Operation a suggestion can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCode {
    /// Reschedule overdue tasks from tomorrow on
    PrioritizeOverdue,
    /// Advisory: revisit project goals
    ReviseGoals,
    /// Push near deadlines forward
    AdjustDeadlines,
    /// Assign unassigned tasks round-robin
    BalanceWorkload,
    /// Advisory: focus on tasks due soon
    AccelerateCompletion,
    /// Advisory: keep going
    MaintainPace,
}

impl ActionCode {
    /// Every known action code.
    pub const ALL: [ActionCode; 6] = [
        ActionCode::PrioritizeOverdue,
        ActionCode::ReviseGoals,
        ActionCode::AdjustDeadlines,
        ActionCode::BalanceWorkload,
        ActionCode::AccelerateCompletion,
        ActionCode::MaintainPace,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::PrioritizeOverdue => "prioritize_overdue",
            ActionCode::ReviseGoals => "revise_goals",
            ActionCode::AdjustDeadlines => "adjust_deadlines",
            ActionCode::BalanceWorkload => "balance_workload",
            ActionCode::AccelerateCompletion => "accelerate_completion",
            ActionCode::MaintainPace => "maintain_pace",
        }
    }

    /// Whether applying this action changes task records.
    pub fn mutates_tasks(&self) -> bool {
        matches!(
            self,
            ActionCode::PrioritizeOverdue | ActionCode::AdjustDeadlines | ActionCode::BalanceWorkload
        )
    }
}

impl std::fmt::Display for ActionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown action code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized action code: {0}")]
pub struct ParseActionError(pub String);

impl std::str::FromStr for ActionCode {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionCode::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// A remediation recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Stable identifier (one per rule)
    pub id: String,

    /// Short title
    pub title: String,

    /// Explanation with the live numbers
    pub description: String,

    /// Operation to apply
    pub action_code: ActionCode,

    /// Priority
    pub priority: Priority,
}

/// One analysis run, as kept in the project's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique identifier
    pub id: AnalysisId,

    /// Analyzed project
    pub project_id: ProjectId,

    /// Health label at the time
    pub status: HealthStatus,

    /// Delay probability (0-95)
    pub probability_of_delay: u8,

    /// Suggestions produced
    pub suggestions: Vec<Suggestion>,

    /// When the analysis ran
    pub timestamp: Time,

    /// Actions applied after this analysis
    #[serde(default)]
    pub applied_actions: Vec<AppliedAction>,
}

/// A suggestion that was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedAction {
    /// Operation applied
    pub action_code: ActionCode,

    /// Suggestion the caller acted on, if given
    pub suggestion_id: Option<String>,

    /// Who applied it
    pub applied_by: UserId,

    /// Tasks changed
    pub affected: usize,

    /// Human summary
    pub summary: String,

    /// When
    pub timestamp: Time,
}
