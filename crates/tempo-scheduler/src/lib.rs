//! # Tempo Scheduler
//!
//! Multi-strategy pipeline scheduler with adaptive learning. Five trigger
//! strategies drive a single execution engine; every execution is tracked,
//! scored, and fed back into per-schedule learning state.
//!
//! ## Design Principles
//! - One `Scheduler` owns all state — no ambient/static collections
//! - Tokio timers only — zero overhead when idle
//! - Pipeline failures are recorded, never propagated to drivers
//! - Adaptive intervals converge from observed outcomes, clamped to bounds
//!
//! ## Architecture
//! ```text
//! Scheduler
//!   ├── interval driver:    fixed period, optional execution cap
//!   ├── cron driver:        "0 2 * * *" in the schedule's timezone
//!   ├── adaptive driver:    period recomputed from the blended score
//!   ├── conditional poller: shared 30s tick over metric predicates
//!   └── event_driven:       fired by host system events, no timer
//!         ↓ fire()
//!   Execution engine → PipelineExecutor
//!         ├── history (bounded per schedule)
//!         ├── stats (totals, per-type performance)
//!         ├── adaptive learning (record → analyze → recommend)
//!         └── broadcast events (scheduler:*, schedule:*, execution:*)
//! ```

pub mod adaptive;
pub mod condition;
pub mod config;
pub mod cron;
pub mod engine;
pub mod events;
pub mod execution;
pub mod schedule;
pub mod stats;

pub use adaptive::{AdaptiveLearning, AdaptiveRecommendations, ExecutionSample, LearningPatterns};
pub use condition::{CompareOp, Condition, ConditionKind, CustomEvaluator};
pub use config::{DaemonConfig, PipelineSpec, ScheduleSpec};
pub use engine::Scheduler;
pub use events::{EventKind, SchedulerEvent, SystemEvent};
pub use execution::{ExecutionStatus, ScheduledExecution, TriggerKind};
pub use schedule::{ScheduleConfig, ScheduleKind, ScheduleUpdate};
pub use stats::SchedulerStats;
