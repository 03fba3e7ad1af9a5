//! Metrics provider seam — the scheduler stays metrics-agnostic.
//!
//! Conditional schedules and the adaptive learning loop both consume host
//! metrics (system health, philosophy scores, guardian performance, file
//! changes). All of it flows through [`MetricsProvider`] so the host wires in
//! whatever monitoring stack it has; [`StaticMetrics`] is the constant-valued
//! fallback used by the daemon default config and by tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate health snapshot of the host system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealthMetrics {
    /// Overall health score, 0..1.
    pub overall_score: f64,
    /// Fraction of recent operations that errored, 0..1.
    pub error_rate: f64,
    /// Average analysis execution time in milliseconds.
    pub average_execution_time: f64,
    /// Number of guardian agents currently active.
    pub active_guardians: u32,
    /// Total completed analyses.
    pub completed_analyses: u64,
    /// Alignment with organizational principles, 0..1.
    pub philosophy_alignment: f64,
}

impl SystemHealthMetrics {
    /// Look up a metric by its config-facing name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "overall_score" => Some(self.overall_score),
            "error_rate" => Some(self.error_rate),
            "average_execution_time" => Some(self.average_execution_time),
            "active_guardians" => Some(f64::from(self.active_guardians)),
            "completed_analyses" => Some(self.completed_analyses as f64),
            "philosophy_alignment" => Some(self.philosophy_alignment),
            _ => None,
        }
    }
}

/// Philosophy alignment scores: one overall value plus named sub-principles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhilosophyScores {
    pub overall: f64,
    #[serde(default)]
    pub principles: HashMap<String, f64>,
}

impl PhilosophyScores {
    /// Score for a named principle, or the overall score when `principle` is None.
    pub fn score(&self, principle: Option<&str>) -> Option<f64> {
        match principle {
            Some(name) => self.principles.get(name).copied(),
            None => Some(self.overall),
        }
    }
}

/// Performance metrics for one guardian (external analysis agent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardianMetrics {
    pub success_rate: f64,
    pub average_score: f64,
    /// Milliseconds.
    pub execution_time: f64,
}

impl GuardianMetrics {
    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "success_rate" => Some(self.success_rate),
            "average_score" => Some(self.average_score),
            "execution_time" => Some(self.execution_time),
            _ => None,
        }
    }
}

/// Kind of filesystem change reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Add,
    Modify,
    Delete,
}

/// One recently changed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub kind: ChangeKind,
    pub changed_at: DateTime<Utc>,
}

/// Host metrics seam. Implementations must be cheap — conditional schedules
/// poll these every 30 seconds.
pub trait MetricsProvider: Send + Sync {
    fn system_health(&self) -> SystemHealthMetrics;

    fn philosophy(&self) -> PhilosophyScores;

    /// Metrics for a named guardian, or None if unknown.
    fn guardian(&self, guardian: &str) -> Option<GuardianMetrics>;

    /// Normalized system load, 0..1.
    fn system_load(&self) -> f64;

    /// Files changed within the last `since_minutes` minutes.
    fn recent_file_changes(&self, since_minutes: u32) -> Vec<FileChange>;
}

/// Constant-valued provider. Field values double as the fixture set for tests.
#[derive(Debug, Clone)]
pub struct StaticMetrics {
    pub health: SystemHealthMetrics,
    pub philosophy: PhilosophyScores,
    pub guardians: HashMap<String, GuardianMetrics>,
    pub load: f64,
    pub file_changes: Vec<FileChange>,
}

impl Default for StaticMetrics {
    fn default() -> Self {
        let mut principles = HashMap::new();
        principles.insert("bien_comun".to_string(), 0.85);
        principles.insert("ayni".to_string(), 0.78);
        principles.insert("cooperacion".to_string(), 0.80);
        principles.insert("negentropia".to_string(), 0.90);

        let mut guardians = HashMap::new();
        guardians.insert(
            "architecture".to_string(),
            GuardianMetrics { success_rate: 0.92, average_score: 0.85, execution_time: 1200.0 },
        );
        guardians.insert(
            "performance".to_string(),
            GuardianMetrics { success_rate: 0.95, average_score: 0.90, execution_time: 800.0 },
        );
        guardians.insert(
            "philosophy".to_string(),
            GuardianMetrics { success_rate: 0.87, average_score: 0.79, execution_time: 2000.0 },
        );

        Self {
            health: SystemHealthMetrics {
                overall_score: 0.85,
                error_rate: 0.02,
                average_execution_time: 2500.0,
                active_guardians: 4,
                completed_analyses: 150,
                philosophy_alignment: 0.78,
            },
            philosophy: PhilosophyScores { overall: 0.82, principles },
            guardians,
            load: 0.7,
            file_changes: Vec::new(),
        }
    }
}

impl MetricsProvider for StaticMetrics {
    fn system_health(&self) -> SystemHealthMetrics {
        self.health.clone()
    }

    fn philosophy(&self) -> PhilosophyScores {
        self.philosophy.clone()
    }

    fn guardian(&self, guardian: &str) -> Option<GuardianMetrics> {
        self.guardians.get(guardian).cloned()
    }

    fn system_load(&self) -> f64 {
        self.load
    }

    fn recent_file_changes(&self, since_minutes: u32) -> Vec<FileChange> {
        let cutoff = Utc::now() - chrono::Duration::minutes(i64::from(since_minutes));
        self.file_changes
            .iter()
            .filter(|c| c.changed_at >= cutoff)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_metric_lookup() {
        let m = StaticMetrics::default().system_health();
        assert_eq!(m.metric("overall_score"), Some(0.85));
        assert_eq!(m.metric("error_rate"), Some(0.02));
        assert_eq!(m.metric("nonsense"), None);
    }

    #[test]
    fn test_philosophy_lookup() {
        let p = StaticMetrics::default().philosophy();
        assert_eq!(p.score(None), Some(0.82));
        assert_eq!(p.score(Some("ayni")), Some(0.78));
        assert_eq!(p.score(Some("unknown")), None);
    }

    #[test]
    fn test_file_changes_respect_window() {
        let mut metrics = StaticMetrics::default();
        metrics.file_changes = vec![
            FileChange {
                path: "src/new.rs".into(),
                kind: ChangeKind::Add,
                changed_at: Utc::now(),
            },
            FileChange {
                path: "src/old.rs".into(),
                kind: ChangeKind::Modify,
                changed_at: Utc::now() - chrono::Duration::hours(2),
            },
        ];
        let recent = metrics.recent_file_changes(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].path, "src/new.rs");
    }
}
