//! Project health classification.
//!
//! The classifier is an ordered table of rules evaluated top to bottom; the
//! first rule whose predicate holds decides the status. The table is public
//! so each rung of the ladder can be inspected and tested on its own.

use planwise_core::{HealthColor, HealthStatus};
use serde::Serialize;

use crate::metrics::MetricSet;

/// One rung of the health ladder.
#[derive(Clone, Copy)]
pub struct HealthRule {
    /// Rule name, for logs and tests
    pub name: &'static str,
    /// Whether the rule matches
    pub applies: fn(&MetricSet) -> bool,
    /// Resulting status
    pub status: HealthStatus,
    /// Resulting color
    pub color: HealthColor,
    /// Explanation template
    pub explain: fn(&MetricSet) -> String,
}

static RULES: [HealthRule; 7] = [
    HealthRule {
        name: "completed",
        applies: is_completed,
        status: HealthStatus::Completed,
        color: HealthColor::Green,
        explain: completion_message,
    },
    HealthRule {
        name: "past_due_override",
        applies: is_open_past_deadline,
        status: HealthStatus::CriticalDelay,
        color: HealthColor::Red,
        explain: past_due_message,
    },
    HealthRule {
        name: "ahead",
        applies: is_ahead,
        status: HealthStatus::Ahead,
        color: HealthColor::Green,
        explain: progress_message,
    },
    HealthRule {
        name: "on_track",
        applies: is_on_track,
        status: HealthStatus::OnTrack,
        color: HealthColor::LightGreen,
        explain: progress_message,
    },
    HealthRule {
        name: "attention",
        applies: needs_attention,
        status: HealthStatus::Attention,
        color: HealthColor::Yellow,
        explain: progress_message,
    },
    HealthRule {
        name: "moderate_delay",
        applies: is_moderately_delayed,
        status: HealthStatus::ModerateDelay,
        color: HealthColor::Orange,
        explain: progress_message,
    },
    HealthRule {
        name: "critical_delay",
        applies: always,
        status: HealthStatus::CriticalDelay,
        color: HealthColor::Red,
        explain: progress_message,
    },
];

fn is_completed(m: &MetricSet) -> bool {
    m.is_completed()
}

fn is_open_past_deadline(m: &MetricSet) -> bool {
    m.is_past_due && m.pending_tasks > 0
}

fn is_ahead(m: &MetricSet) -> bool {
    m.spi >= 1.1 && m.overdue_tasks == 0
}

fn is_on_track(m: &MetricSet) -> bool {
    m.spi >= 0.95 && m.overdue_tasks == 0
}

fn needs_attention(m: &MetricSet) -> bool {
    m.spi >= 0.85 || m.overdue_tasks <= 2
}

fn is_moderately_delayed(m: &MetricSet) -> bool {
    m.spi >= 0.6 || m.overdue_tasks <= 5
}

fn always(_: &MetricSet) -> bool {
    true
}

fn completion_message(m: &MetricSet) -> String {
    if m.remaining_days > 0 {
        format!(
            "Congratulations! Project completed {} days ahead of schedule",
            m.remaining_days
        )
    } else if m.is_past_due {
        "Project completed after the deadline".to_string()
    } else {
        "Congratulations! Project completed exactly on schedule".to_string()
    }
}

fn past_due_message(m: &MetricSet) -> String {
    format!(
        "Project overdue: {} tasks still pending after the deadline",
        m.pending_tasks
    )
}

fn progress_message(m: &MetricSet) -> String {
    let mut text = if m.delay_days > 0.0 {
        format!(
            "Projected {:.1} days behind schedule. {} days left to finish {} tasks",
            m.delay_days, m.remaining_days, m.pending_tasks
        )
    } else if m.remaining_days > 0 {
        format!("{} days left to finish {} tasks", m.remaining_days, m.pending_tasks)
    } else {
        format!("Deadline reached. {} tasks pending", m.pending_tasks)
    };
    if m.overdue_tasks > 0 {
        text.push_str(&format!(" ({} overdue)", m.overdue_tasks));
    }
    text
}

/// Result of classifying a [`MetricSet`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthAssessment {
    /// Health label
    pub status: HealthStatus,
    /// Severity color
    pub color: HealthColor,
    /// Explanation built from the same metrics
    pub explanation: String,
    /// Name of the rule that matched
    pub rule: &'static str,
}

/// Classifies project health from metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthClassifier;

impl HealthClassifier {
    /// Create a new classifier.
    pub fn new() -> Self {
        Self
    }

    /// The rule ladder, in evaluation order.
    pub fn rules() -> &'static [HealthRule] {
        &RULES
    }

    /// Classify a project. The last rule always matches.
    pub fn classify(&self, metrics: &MetricSet) -> HealthAssessment {
        let fallback = &RULES[RULES.len() - 1];
        let rule = RULES
            .iter()
            .find(|r| (r.applies)(metrics))
            .unwrap_or(fallback);

        HealthAssessment {
            status: rule.status,
            color: rule.color,
            explanation: (rule.explain)(metrics),
            rule: rule.name,
        }
    }
}
