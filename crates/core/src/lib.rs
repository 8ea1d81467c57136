//! Planwise core data models.
//!
//! This crate defines the data structures shared by the storage layer and
//! the project performance engine.

#![warn(missing_docs)]

// Core identities
mod id;

// Schedule
mod project;
mod task;

// Analysis outputs
mod analysis;

// Re-exports
pub use id::*;

pub use project::{Project, Collaborator, ProjectRole};
pub use task::{Task, TaskFilter, DEFAULT_COMPLEXITY};
pub use analysis::{
    HealthStatus, HealthColor, Priority, ActionCode, ParseActionError,
    Suggestion, AnalysisRecord, AppliedAction,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
