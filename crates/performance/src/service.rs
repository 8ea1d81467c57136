//! Performance service.
//!
//! Ties the engine to a [`Storage`] backend: loads a project and its tasks,
//! runs the analysis pipeline, records history, and applies actions.

use std::sync::Arc;

use chrono::Utc;
use planwise_core::{
    ActionCode, AnalysisId, AnalysisRecord, AppliedAction, HealthColor, HealthStatus,
    ParseActionError, Project, ProjectId, Suggestion, TaskFilter, Time, UserId,
};
use planwise_storage::{Storage, StorageError};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::actions::{ActionApplier, ActionOutcome};
use crate::config::EngineConfig;
use crate::health::HealthClassifier;
use crate::metrics::{MetricSet, MetricsCalculator};
use crate::risk::DelayRiskScorer;
use crate::suggestion::SuggestionEngine;
use crate::workload::WorkloadSnapshot;

/// Errors returned by [`PerformanceService`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The project does not exist
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// The caller is not a leader of the project
    #[error("user {user} is not a leader of project {project}")]
    Unauthorized {
        /// The caller
        user: UserId,
        /// The project
        project: ProjectId,
    },

    /// Unknown action code
    #[error(transparent)]
    InvalidAction(#[from] ParseActionError),

    /// Storage failure
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::NotFound(_) => 404,
            ServiceError::Unauthorized { .. } => 403,
            ServiceError::InvalidAction(_) => 400,
            ServiceError::Storage(_) => 500,
        }
    }
}

/// Service result type.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Full analysis of a project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnalysis {
    /// Recorded history entry
    pub analysis_id: AnalysisId,
    /// The project
    pub project_id: ProjectId,
    /// Health status
    pub status: HealthStatus,
    /// Display color
    pub color: HealthColor,
    /// Explanation of the status
    pub explanation: String,
    /// Computed metrics
    pub metrics: MetricSet,
    /// Probability of delay, 0-95
    pub probability_of_delay: u8,
    /// Suggestions, highest priority first
    pub suggestions: Vec<Suggestion>,
    /// When the analysis ran
    pub timestamp: Time,
}

/// Result of [`PerformanceService::analyze`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The project was analyzed and the result recorded
    Analyzed(ProjectAnalysis),
    /// The project has no tasks; nothing was recorded
    NoMetrics {
        /// The project
        project_id: ProjectId,
        /// Why there is no analysis
        message: String,
    },
}

/// Result of [`PerformanceService::apply_suggestion`].
#[derive(Debug, Clone, Serialize)]
pub struct AppliedSuggestion {
    /// Always `true`; failures are errors
    pub applied: bool,
    /// The project
    pub project_id: ProjectId,
    /// What the action did
    pub outcome: ActionOutcome,
    /// Whether the action was attached to an analysis record
    pub recorded: bool,
}

/// Analysis and remediation over a storage backend.
pub struct PerformanceService<S: Storage> {
    storage: Arc<Mutex<S>>,
    config: EngineConfig,
}

impl<S: Storage> PerformanceService<S> {
    /// Create a service with default configuration.
    pub fn new(storage: S) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            config: EngineConfig::default(),
        }
    }

    /// Set the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Shared handle to the storage backend.
    pub fn storage(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.storage)
    }

    /// Analyze a project now.
    pub async fn analyze(&self, project_id: ProjectId) -> Result<AnalysisOutcome> {
        self.analyze_at(project_id, Utc::now()).await
    }

    /// Analyze a project as of `now` and record the result.
    pub async fn analyze_at(&self, project_id: ProjectId, now: Time) -> Result<AnalysisOutcome> {
        let mut storage = self.storage.lock().await;

        let project = load_project(&*storage, project_id).await?;
        let tasks = storage.list_tasks(&TaskFilter::for_project(project_id)).await?;

        let Some(metrics) = MetricsCalculator::new().compute(&project, &tasks, now) else {
            debug!("Project {} has no tasks", project_id);
            return Ok(AnalysisOutcome::NoMetrics {
                project_id,
                message: "Project has no tasks to analyze".to_string(),
            });
        };

        let collaborators = storage.list_collaborators(project_id).await?;
        let workload =
            Some(WorkloadSnapshot::from_tasks(&collaborators, &tasks)).filter(|w| !w.is_empty());

        let assessment = HealthClassifier::new().classify(&metrics);
        let probability = DelayRiskScorer::new().score(&metrics, workload.as_ref());
        let suggestions = SuggestionEngine::new()
            .with_config(self.config.clone())
            .generate(&metrics, workload.as_ref());

        let record = AnalysisRecord {
            id: AnalysisId::new(),
            project_id,
            status: assessment.status,
            probability_of_delay: probability,
            suggestions: suggestions.clone(),
            timestamp: now,
            applied_actions: Vec::new(),
        };

        if let Err(e) = record_analysis(&mut *storage, &record).await {
            error!("Failed to record analysis for {}: {}", project_id, e);
            rollback(&mut *storage).await;
            return Err(e.into());
        }

        info!(
            "Analyzed {}: {} ({}% delay risk, {} suggestions)",
            project_id, assessment.status, probability, suggestions.len()
        );

        Ok(AnalysisOutcome::Analyzed(ProjectAnalysis {
            analysis_id: record.id,
            project_id,
            status: assessment.status,
            color: assessment.color,
            explanation: assessment.explanation,
            metrics,
            probability_of_delay: probability,
            suggestions,
            timestamp: now,
        }))
    }

    /// Apply an action now.
    pub async fn apply_suggestion(
        &self,
        project_id: ProjectId,
        caller: UserId,
        action_code: &str,
        suggestion_id: Option<&str>,
    ) -> Result<AppliedSuggestion> {
        self.apply_suggestion_at(project_id, caller, action_code, suggestion_id, Utc::now())
            .await
    }

    /// Apply an action as of `now`.
    ///
    /// Only project leaders may apply actions. Authorization is checked
    /// before the action code is parsed, and nothing is written unless both
    /// pass. Persistence is all-or-nothing.
    pub async fn apply_suggestion_at(
        &self,
        project_id: ProjectId,
        caller: UserId,
        action_code: &str,
        suggestion_id: Option<&str>,
        now: Time,
    ) -> Result<AppliedSuggestion> {
        let mut storage = self.storage.lock().await;

        let project = load_project(&*storage, project_id).await?;
        if !project.is_leader(caller) {
            warn!("User {} may not apply actions to {}", caller, project_id);
            return Err(ServiceError::Unauthorized { user: caller, project: project_id });
        }

        let action: ActionCode = action_code.parse().map_err(|e: ParseActionError| {
            warn!("Rejected action for {}: {}", project_id, e);
            ServiceError::from(e)
        })?;

        let mut tasks = storage.list_tasks(&TaskFilter::for_project(project_id)).await?;
        let outcome = ActionApplier::new()
            .with_config(self.config.actions.clone())
            .apply(action, &project, &mut tasks, now);

        let applied = AppliedAction {
            action_code: action,
            suggestion_id: suggestion_id.map(str::to_string),
            applied_by: caller,
            affected: outcome.affected,
            summary: outcome.summary.clone(),
            timestamp: now,
        };

        let changed = outcome.changed_tasks();
        let persisted: std::result::Result<bool, StorageError> = async {
            if action.mutates_tasks() {
                for task in tasks.iter().filter(|t| changed.contains(&t.id)) {
                    storage.save_task(task).await?;
                }
            }
            let recorded = storage.record_applied_action(project_id, &applied).await?;
            storage.commit(&format!("apply {} to {}", action, project_id)).await?;
            Ok(recorded)
        }
        .await;

        let recorded = match persisted {
            Ok(recorded) => recorded,
            Err(e) => {
                error!("Failed to apply {} to {}: {}", action, project_id, e);
                rollback(&mut *storage).await;
                return Err(e.into());
            }
        };

        if !recorded {
            debug!("Project {} has no analysis to attach {} to", project_id, action);
        }
        info!("Applied {} to {}: {} tasks affected", action, project_id, outcome.affected);

        Ok(AppliedSuggestion { applied: true, project_id, outcome, recorded })
    }

    /// Analysis history of a project, oldest first.
    pub async fn history(&self, project_id: ProjectId) -> Result<Vec<AnalysisRecord>> {
        let storage = self.storage.lock().await;
        load_project(&*storage, project_id).await?;
        Ok(storage.list_analyses(project_id).await?)
    }
}

async fn load_project<S: Storage>(storage: &S, project_id: ProjectId) -> Result<Project> {
    storage
        .load_project(project_id)
        .await?
        .ok_or(ServiceError::NotFound(project_id))
}

async fn record_analysis<S: Storage>(
    storage: &mut S,
    record: &AnalysisRecord,
) -> std::result::Result<(), StorageError> {
    storage.append_analysis(record).await?;
    storage
        .commit(&format!("analysis {} of {}", record.id, record.project_id))
        .await
}

async fn rollback<S: Storage>(storage: &mut S) {
    if let Err(e) = storage.rollback().await {
        error!("Rollback failed: {}", e);
    }
}
