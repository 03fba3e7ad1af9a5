//! Tempo error type.

use thiserror::Error;

/// Errors surfaced by Tempo crates.
#[derive(Debug, Error)]
pub enum TempoError {
    /// Invalid or unreadable configuration file.
    #[error("config error: {0}")]
    Config(String),

    /// Schedule registration/update rejected (missing fields, duplicate id,
    /// malformed type-specific payload).
    #[error("schedule error: {0}")]
    Schedule(String),

    /// Pipeline execution failed. Captured by the execution engine and turned
    /// into a failed execution record, never propagated to drivers.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// Condition evaluation failed (custom evaluators only).
    #[error("condition error: {0}")]
    Condition(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TempoError>;
