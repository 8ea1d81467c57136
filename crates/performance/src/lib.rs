//! Project Performance & Recommendation Engine
//!
//! Earned-value metrics, health classification, delay risk, remediation
//! suggestions, and the actions that apply them.
//!
//! ```text
//! tasks ──► MetricsCalculator ──► MetricSet ──┬─► HealthClassifier
//!                                             ├─► DelayRiskScorer
//!                                             └─► SuggestionEngine ──► ActionApplier
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod metrics;
pub mod health;
pub mod risk;
pub mod workload;
pub mod suggestion;
pub mod actions;
pub mod service;

pub use config::{EngineConfig, ActionConfig, ConfigError, MAX_ACTION_DAYS};
pub use metrics::{MetricSet, MetricsCalculator, COMPLETION_THRESHOLD};
pub use health::{HealthClassifier, HealthAssessment, HealthRule};
pub use risk::{DelayRiskScorer, RiskBreakdown, MAX_PROBABILITY};
pub use workload::{WorkloadSnapshot, MemberLoad, WorkloadImbalance};
pub use suggestion::SuggestionEngine;
pub use actions::{ActionApplier, ActionOutcome, ActionDetail, DueDateChange, Assignment};
pub use service::{
    PerformanceService, ServiceError, AnalysisOutcome, ProjectAnalysis, AppliedSuggestion,
};
