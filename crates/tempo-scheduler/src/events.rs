//! Event surface — every scheduler transition is published for external
//! observers (dashboards, alerting, logging).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::AdaptiveRecommendations;
use crate::execution::ScheduledExecution;

/// A published scheduler event with its emission timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl SchedulerEvent {
    pub fn now(kind: EventKind) -> Self {
        Self { timestamp: Utc::now(), kind }
    }

    /// Event name observers subscribe by, e.g. `execution:completed`.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventKind {
    SchedulerStarted,
    SchedulerStopped,
    ScheduleCreated { schedule_id: String, pipeline_id: String },
    ScheduleUpdated { schedule_id: String },
    ScheduleDeleted { schedule_id: String },
    SchedulePaused { schedule_id: String },
    ScheduleResumed { schedule_id: String },
    ExecutionCompleted { execution: ScheduledExecution },
    ExecutionFailed { execution: ScheduledExecution, error: String },
    ExecutionSkipped { schedule_id: String, execution_id: String },
    AdaptiveRecommendationsUpdated {
        schedule_id: String,
        recommendations: AdaptiveRecommendations,
    },
    ConditionEvaluationFailed { condition_id: String, error: String },
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::SchedulerStarted => "scheduler:started",
            EventKind::SchedulerStopped => "scheduler:stopped",
            EventKind::ScheduleCreated { .. } => "schedule:created",
            EventKind::ScheduleUpdated { .. } => "schedule:updated",
            EventKind::ScheduleDeleted { .. } => "schedule:deleted",
            EventKind::SchedulePaused { .. } => "schedule:paused",
            EventKind::ScheduleResumed { .. } => "schedule:resumed",
            EventKind::ExecutionCompleted { .. } => "execution:completed",
            EventKind::ExecutionFailed { .. } => "execution:failed",
            EventKind::ExecutionSkipped { .. } => "execution:skipped",
            EventKind::AdaptiveRecommendationsUpdated { .. } => {
                "adaptive:recommendations_updated"
            }
            EventKind::ConditionEvaluationFailed { .. } => "condition:evaluation_failed",
        }
    }
}

/// Host system events that drive event_driven schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemEvent {
    FileChanged,
    AnalysisCompleted,
    PhilosophyDegraded,
}

impl SystemEvent {
    /// Canonical name matched against `trigger_events` entries.
    pub fn name(&self) -> &'static str {
        match self {
            SystemEvent::FileChanged => "system:file_changed",
            SystemEvent::AnalysisCompleted => "system:analysis_completed",
            SystemEvent::PhilosophyDegraded => "system:philosophy_degraded",
        }
    }
}
