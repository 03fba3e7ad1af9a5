//! Daemon configuration loaded from a TOML file.
//!
//! A config file declares named pipelines (shell commands) and the schedules
//! that drive them:
//!
//! ```toml
//! [[pipeline]]
//! id = "nightly-report"
//! command = "make report"
//!
//! [[schedule]]
//! id = "nightly"
//! name = "Nightly report"
//! pipeline = "nightly-report"
//! timezone = "America/Bogota"
//! type = "cron"
//! expression = "0 2 * * *"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempo_core::{Result, TempoError};

use crate::schedule::ScheduleConfig;

/// A named shell command a schedule can be bound to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub id: String,
    pub command: String,
}

/// One `[[schedule]]` table: a schedule config plus the pipeline it drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSpec {
    pub pipeline: String,
    #[serde(flatten)]
    pub config: ScheduleConfig,
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Tracing filter directive, e.g. "info" or "tempo_scheduler=debug".
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default, rename = "pipeline")]
    pub pipelines: Vec<PipelineSpec>,
    #[serde(default, rename = "schedule")]
    pub schedules: Vec<ScheduleSpec>,
}

impl DaemonConfig {
    /// Default config location: `~/.tempo/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tempo")
            .join("config.toml")
    }

    /// Load from the default path; a missing file yields the empty config.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| TempoError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks: unique ids, every schedule bound to a declared
    /// pipeline, every schedule config well-formed.
    pub fn validate(&self) -> Result<()> {
        let mut pipeline_ids = Vec::new();
        for pipeline in &self.pipelines {
            if pipeline.id.is_empty() || pipeline.command.is_empty() {
                return Err(TempoError::Config(
                    "pipeline id and command must be non-empty".into(),
                ));
            }
            if pipeline_ids.contains(&pipeline.id.as_str()) {
                return Err(TempoError::Config(format!(
                    "duplicate pipeline id '{}'",
                    pipeline.id
                )));
            }
            pipeline_ids.push(&pipeline.id);
        }

        let mut schedule_ids = Vec::new();
        for spec in &self.schedules {
            spec.config.validate()?;
            if schedule_ids.contains(&spec.config.id.as_str()) {
                return Err(TempoError::Config(format!(
                    "duplicate schedule id '{}'",
                    spec.config.id
                )));
            }
            schedule_ids.push(&spec.config.id);
            if !pipeline_ids.contains(&spec.pipeline.as_str()) {
                return Err(TempoError::Config(format!(
                    "schedule '{}' references unknown pipeline '{}'",
                    spec.config.id, spec.pipeline
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleKind;

    const SAMPLE: &str = r#"
log_level = "debug"

[[pipeline]]
id = "health-check"
command = "scripts/health.sh"

[[pipeline]]
id = "deep-analysis"
command = "make analyze"

[[schedule]]
id = "health"
name = "Health check"
pipeline = "health-check"
type = "interval"
minutes = 5.0

[[schedule]]
id = "nightly"
name = "Nightly analysis"
pipeline = "deep-analysis"
timezone = "America/Bogota"
type = "cron"
expression = "0 2 * * *"

[[schedule]]
id = "busy-hours"
name = "Business hours poll"
pipeline = "health-check"
type = "conditional"
require_all = true
conditions = [
    { id = "hours", operator = "gte", type = "time_range", start_hour = 9, end_hour = 17, days_of_week = [1, 2, 3, 4, 5] },
]
"#;

    #[test]
    fn test_parse_sample_config() {
        let config: DaemonConfig = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.pipelines.len(), 2);
        assert_eq!(config.schedules.len(), 3);
        assert!(matches!(
            config.schedules[0].config.kind,
            ScheduleKind::Interval { minutes, .. } if minutes == 5.0
        ));
        assert!(matches!(config.schedules[1].config.kind, ScheduleKind::Cron { .. }));
        assert_eq!(
            config.schedules[1].config.timezone.as_deref(),
            Some("America/Bogota")
        );
        assert!(config.schedules[2].config.enabled);
    }

    #[test]
    fn test_unknown_pipeline_rejected() {
        let raw = r#"
[[schedule]]
id = "s1"
name = "Orphan"
pipeline = "nope"
type = "interval"
minutes = 1.0
"#;
        let config: DaemonConfig = toml::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_schedule_id_rejected() {
        let raw = r#"
[[pipeline]]
id = "p"
command = "true"

[[schedule]]
id = "s1"
name = "A"
pipeline = "p"
type = "interval"
minutes = 1.0

[[schedule]]
id = "s1"
name = "B"
pipeline = "p"
type = "interval"
minutes = 2.0
"#;
        let config: DaemonConfig = toml::from_str(raw).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_config() {
        let config: DaemonConfig = toml::from_str("").unwrap();
        config.validate().unwrap();
        assert!(config.pipelines.is_empty());
        assert!(config.schedules.is_empty());
    }
}
