//! Execution records — one per fired trigger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which driver fired an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Interval,
    Cron,
    Adaptive,
    Conditional,
    EventDriven,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Interval => "interval",
            TriggerKind::Cron => "cron",
            TriggerKind::Adaptive => "adaptive",
            TriggerKind::Conditional => "conditional",
            TriggerKind::EventDriven => "event_driven",
        }
    }
}

/// Linear execution lifecycle. `Skipped` marks a firing suppressed by the
/// per-schedule in-flight guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

/// One firing instance of a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledExecution {
    pub id: String,
    pub schedule_id: String,
    pub pipeline_id: String,
    pub scheduled_time: DateTime<Utc>,
    pub actual_time: Option<DateTime<Utc>>,
    pub status: ExecutionStatus,
    /// Wall-clock pipeline duration in milliseconds, set on completion.
    pub execution_time_ms: Option<u64>,
    /// Failure message when status is `Failed`.
    pub reason: Option<String>,
    pub trigger: TriggerKind,
    /// Adaptive score at fire time; 0.5 when no learning state exists.
    pub adaptive_score: f64,
}

impl ScheduledExecution {
    pub fn new(
        schedule_id: &str,
        pipeline_id: &str,
        trigger: TriggerKind,
        adaptive_score: f64,
    ) -> Self {
        Self {
            id: generate_execution_id(),
            schedule_id: schedule_id.to_string(),
            pipeline_id: pipeline_id.to_string(),
            scheduled_time: Utc::now(),
            actual_time: None,
            status: ExecutionStatus::Pending,
            execution_time_ms: None,
            reason: None,
            trigger,
            adaptive_score,
        }
    }
}

/// Time + random execution id, e.g. `sched_exec_1761050000123_a3f9c1`.
fn generate_execution_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::random::<u32>() & 0x00ff_ffff;
    format!("sched_exec_{millis}_{suffix:06x}")
}
