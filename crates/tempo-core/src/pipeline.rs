//! Pipeline executor seam — the scheduler invokes work, it never defines it.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Result, TempoError};

/// Runs one pipeline by id. The scheduler times the call and records the
/// outcome; a returned error becomes a failed execution record.
#[async_trait]
pub trait PipelineExecutor: Send + Sync {
    async fn execute(&self, pipeline_id: &str) -> Result<()>;
}

/// Shell-command pipeline executor: each pipeline id maps to a command line
/// run via `sh -c`. Non-zero exit status is a pipeline failure.
pub struct CommandPipeline {
    commands: HashMap<String, String>,
}

impl CommandPipeline {
    pub fn new() -> Self {
        Self { commands: HashMap::new() }
    }

    /// Register a pipeline id → command mapping.
    pub fn register(&mut self, pipeline_id: &str, command: &str) {
        self.commands.insert(pipeline_id.to_string(), command.to_string());
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PipelineExecutor for CommandPipeline {
    async fn execute(&self, pipeline_id: &str) -> Result<()> {
        let command = self
            .commands
            .get(pipeline_id)
            .ok_or_else(|| TempoError::Pipeline(format!("unknown pipeline '{pipeline_id}'")))?;

        tracing::debug!("🚀 Pipeline '{}': {}", pipeline_id, command);

        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|e| TempoError::Pipeline(format!("spawn failed: {e}")))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TempoError::Pipeline(format!(
                "pipeline '{}' exited with {}: {}",
                pipeline_id,
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_pipeline_success() {
        let mut pipelines = CommandPipeline::new();
        pipelines.register("ok", "true");
        assert!(pipelines.execute("ok").await.is_ok());
    }

    #[tokio::test]
    async fn test_command_pipeline_failure() {
        let mut pipelines = CommandPipeline::new();
        pipelines.register("bad", "false");
        let err = pipelines.execute("bad").await.unwrap_err();
        assert!(matches!(err, TempoError::Pipeline(_)));
    }

    #[tokio::test]
    async fn test_unknown_pipeline() {
        let pipelines = CommandPipeline::new();
        assert!(pipelines.execute("missing").await.is_err());
    }
}
