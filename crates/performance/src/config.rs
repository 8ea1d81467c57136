//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the performance engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pending-task spread between members above which the team counts as
    /// unbalanced
    #[serde(default = "default_imbalance_threshold")]
    pub workload_imbalance_threshold: usize,

    /// Parameters of the schedule-changing actions
    #[serde(default)]
    pub actions: ActionConfig,
}

fn default_imbalance_threshold() -> usize {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workload_imbalance_threshold: default_imbalance_threshold(),
            actions: ActionConfig::default(),
        }
    }
}

/// Parameters of the actions applied by [`crate::ActionApplier`].
///
/// `deadline_window_days` must stay below `deadline_extension_days`,
/// otherwise a moved deadline lands back in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Days between consecutive rescheduled overdue tasks
    #[serde(default = "default_stagger_days")]
    pub stagger_days: i64,

    /// Tasks due within this many days count as "near deadline"
    #[serde(default = "default_window_days")]
    pub deadline_window_days: i64,

    /// Days a near deadline is pushed forward
    #[serde(default = "default_extension_days")]
    pub deadline_extension_days: i64,
}

fn default_stagger_days() -> i64 {
    2
}

fn default_window_days() -> i64 {
    3
}

fn default_extension_days() -> i64 {
    7
}

/// Upper bound on any day count in [`ActionConfig`].
pub const MAX_ACTION_DAYS: i64 = 3650;

/// Invalid engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A day count is outside its allowed range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Offending field
        field: &'static str,
        /// Configured value
        value: i64,
        /// Smallest allowed value
        min: i64,
        /// Largest allowed value
        max: i64,
    },

    /// Moved deadlines would land back inside the window
    #[error("deadline_extension_days ({extension}) must exceed deadline_window_days ({window})")]
    ExtensionWithinWindow {
        /// Configured extension
        extension: i64,
        /// Configured window
        window: i64,
    },
}

impl EngineConfig {
    /// Check the configuration before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.actions.validate()
    }
}

impl ActionConfig {
    /// Reject day counts that would break action idempotence or overflow
    /// date arithmetic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("stagger_days", self.stagger_days, 1)?;
        check_range("deadline_window_days", self.deadline_window_days, 0)?;
        check_range("deadline_extension_days", self.deadline_extension_days, 1)?;
        if self.deadline_extension_days <= self.deadline_window_days {
            return Err(ConfigError::ExtensionWithinWindow {
                extension: self.deadline_extension_days,
                window: self.deadline_window_days,
            });
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: i64, min: i64) -> Result<(), ConfigError> {
    if (min..=MAX_ACTION_DAYS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, min, max: MAX_ACTION_DAYS })
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            stagger_days: default_stagger_days(),
            deadline_window_days: default_window_days(),
            deadline_extension_days: default_extension_days(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"actions": {"stagger_days": 1}}"#).unwrap();
        assert_eq!(config.workload_imbalance_threshold, 3);
        assert_eq!(config.actions.stagger_days, 1);
        assert_eq!(config.actions.deadline_window_days, 3);
        assert_eq!(config.actions.deadline_extension_days, 7);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_day_counts() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"actions": {"stagger_days": -2}}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "stagger_days", value: -2, .. })
        ));

        let huge = ActionConfig { stagger_days: i64::MAX, ..Default::default() };
        assert!(matches!(huge.validate(), Err(ConfigError::OutOfRange { .. })));

        let overlapping = ActionConfig {
            deadline_window_days: 7,
            deadline_extension_days: 7,
            ..Default::default()
        };
        assert_eq!(
            overlapping.validate(),
            Err(ConfigError::ExtensionWithinWindow { extension: 7, window: 7 })
        );
    }
}
