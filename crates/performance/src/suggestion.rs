//! Remediation suggestions.

use std::cmp::Reverse;

use planwise_core::{ActionCode, Priority, Suggestion};
use tracing::debug;

use crate::config::EngineConfig;
use crate::metrics::MetricSet;
use crate::workload::WorkloadSnapshot;

/// Generates prioritized suggestions from metrics and team workload.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    config: EngineConfig,
}

impl SuggestionEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Suggestions, highest priority first. Rules that fire with equal
    /// priority keep their evaluation order.
    pub fn generate(&self, metrics: &MetricSet, workload: Option<&WorkloadSnapshot>) -> Vec<Suggestion> {
        if metrics.is_completed() {
            return Vec::new();
        }

        let mut suggestions = Vec::new();

        if metrics.overdue_tasks > 0 {
            let priority = if metrics.overdue_tasks > 5 || metrics.spi < 0.7 {
                Priority::High
            } else {
                Priority::Medium
            };
            suggestions.push(suggestion(
                ActionCode::PrioritizeOverdue,
                "Prioritize overdue tasks",
                format!(
                    "Prioritize the {} overdue tasks and focus on the critical path to recover the schedule. \
                     Projected delay: {:.1} days.",
                    metrics.overdue_tasks, metrics.delay_days
                ),
                priority,
            ));
        }

        if metrics.tcpi > 1.2 {
            suggestions.push(suggestion(
                ActionCode::ReviseGoals,
                "Revise project goals",
                format!(
                    "A TCPI of {:.2} requires performance well above plan. \
                     Consider reducing scope, adding resources or renegotiating deadlines.",
                    metrics.tcpi
                ),
                Priority::High,
            ));
        }

        if metrics.vac < -7.0 {
            let priority = if metrics.vac < -14.0 { Priority::High } else { Priority::Medium };
            suggestions.push(suggestion(
                ActionCode::AdjustDeadlines,
                "Adjust schedule",
                format!(
                    "Forecast of {:.0} days late delivery with {} days remaining. \
                     Consider extending deadlines or reducing scope.",
                    -metrics.vac, metrics.remaining_days
                ),
                priority,
            ));
        }

        if let Some(imbalance) =
            workload.and_then(|w| w.imbalance(self.config.workload_imbalance_threshold))
        {
            suggestions.push(suggestion(
                ActionCode::BalanceWorkload,
                "Balance workload",
                format!(
                    "Spread tasks more evenly: {} tasks difference between members \
                     (most loaded: {}, least loaded: {}).",
                    imbalance.spread, imbalance.max, imbalance.min
                ),
                Priority::Medium,
            ));
        }

        if metrics.completion_rate < 50.0 && metrics.remaining_days < 7 {
            suggestions.push(suggestion(
                ActionCode::AccelerateCompletion,
                "Accelerate completion",
                format!(
                    "Only {:.1}% complete with {} days remaining. \
                     Focus on critical tasks to meet the deadline.",
                    metrics.completion_rate, metrics.remaining_days
                ),
                Priority::High,
            ));
        }

        if metrics.spi >= 1.0 && metrics.tcpi <= 1.1 && metrics.vac >= 0.0 && metrics.overdue_tasks == 0 {
            suggestions.push(suggestion(
                ActionCode::MaintainPace,
                "Maintain current pace",
                "Project is on track. Keep the current pace and stay focused on completion.".to_string(),
                Priority::Low,
            ));
        }

        // Stable: equal priorities keep rule order.
        suggestions.sort_by_key(|s| Reverse(s.priority.weight()));
        debug!("Generated {} suggestions", suggestions.len());
        suggestions
    }
}

fn suggestion(action: ActionCode, title: &str, description: String, priority: Priority) -> Suggestion {
    Suggestion {
        id: action.as_str().to_string(),
        title: title.to_string(),
        description,
        action_code: action,
        priority,
    }
}
