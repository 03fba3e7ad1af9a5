//! # Tempo Core
//!
//! Shared foundation for the Tempo scheduler: the error type, the collaborator
//! traits the scheduler is built against, and the metric value types those
//! traits exchange.
//!
//! The scheduler itself never measures the host system and never owns the work
//! it triggers — both concerns are injected:
//! - [`PipelineExecutor`] runs the actual job body (opaque to the scheduler).
//! - [`MetricsProvider`] answers questions about system health, philosophy
//!   alignment, guardian performance, and recent file changes.

pub mod error;
pub mod metrics;
pub mod pipeline;

pub use error::{Result, TempoError};
pub use metrics::{
    ChangeKind, FileChange, GuardianMetrics, MetricsProvider, PhilosophyScores, StaticMetrics,
    SystemHealthMetrics,
};
pub use pipeline::{CommandPipeline, PipelineExecutor};
