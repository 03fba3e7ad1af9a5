//! Schedule definitions — the core data model for scheduling intent.

use serde::{Deserialize, Serialize};
use tempo_core::{Result, TempoError};

use crate::condition::Condition;
use crate::cron;

/// A named, typed configuration describing when to trigger a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Unique schedule id, caller-supplied.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether the schedule is active. Toggled by pause/resume.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Timezone for cron evaluation (e.g. "America/Bogota"). UTC when unset.
    #[serde(default)]
    pub timezone: Option<String>,
    /// Trigger strategy and its type-specific payload.
    #[serde(flatten)]
    pub kind: ScheduleKind,
}

fn default_enabled() -> bool {
    true
}

/// How a schedule triggers. Intervals are expressed in minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleKind {
    /// Fixed-period repeating timer; optionally self-stops after
    /// `max_executions` firings.
    Interval {
        minutes: f64,
        #[serde(default)]
        max_executions: Option<u32>,
    },
    /// Standard 5/6-field cron expression, evaluated in the schedule timezone.
    Cron { expression: String },
    /// Self-rescheduling timer whose period is recomputed after every firing
    /// from the adaptive score.
    Adaptive {
        base_interval: f64,
        min_interval: f64,
        max_interval: f64,
        adaptation_factor: f64,
    },
    /// Fires on the shared 30s poller tick whenever the combined predicate
    /// holds.
    Conditional {
        conditions: Vec<Condition>,
        #[serde(default)]
        require_all: bool,
    },
    /// Fires when the host emits one of the named system events.
    EventDriven { trigger_events: Vec<String> },
}

impl ScheduleKind {
    /// Stable type name used for stats keys and trigger metadata.
    pub fn type_name(&self) -> &'static str {
        match self {
            ScheduleKind::Interval { .. } => "interval",
            ScheduleKind::Cron { .. } => "cron",
            ScheduleKind::Adaptive { .. } => "adaptive",
            ScheduleKind::Conditional { .. } => "conditional",
            ScheduleKind::EventDriven { .. } => "event_driven",
        }
    }
}

impl ScheduleConfig {
    /// Interval schedule firing every `minutes`.
    pub fn interval(id: &str, name: &str, minutes: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            enabled: true,
            timezone: None,
            kind: ScheduleKind::Interval { minutes, max_executions: None },
        }
    }

    /// Cron schedule with a standard expression.
    pub fn cron(id: &str, name: &str, expression: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            enabled: true,
            timezone: None,
            kind: ScheduleKind::Cron { expression: expression.to_string() },
        }
    }

    /// Adaptive schedule starting at `base_interval` minutes.
    pub fn adaptive(
        id: &str,
        name: &str,
        base_interval: f64,
        min_interval: f64,
        max_interval: f64,
        adaptation_factor: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            enabled: true,
            timezone: None,
            kind: ScheduleKind::Adaptive {
                base_interval,
                min_interval,
                max_interval,
                adaptation_factor,
            },
        }
    }

    /// Conditional schedule over the given predicate set.
    pub fn conditional(id: &str, name: &str, conditions: Vec<Condition>, require_all: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            enabled: true,
            timezone: None,
            kind: ScheduleKind::Conditional { conditions, require_all },
        }
    }

    /// Event-driven schedule reacting to the named system events.
    pub fn event_driven(id: &str, name: &str, trigger_events: Vec<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            enabled: true,
            timezone: None,
            kind: ScheduleKind::EventDriven { trigger_events },
        }
    }

    /// Validate shape before acceptance. The registry additionally rejects
    /// duplicate ids.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() || self.name.trim().is_empty() {
            return Err(TempoError::Schedule("schedule requires id and name".into()));
        }

        if let Some(tz) = &self.timezone {
            cron::parse_timezone(tz)?;
        }

        match &self.kind {
            ScheduleKind::Interval { minutes, max_executions } => {
                if *minutes <= 0.0 {
                    return Err(TempoError::Schedule(
                        "interval schedule requires minutes > 0".into(),
                    ));
                }
                if *max_executions == Some(0) {
                    return Err(TempoError::Schedule(
                        "interval max_executions must be > 0 when set".into(),
                    ));
                }
            }
            ScheduleKind::Cron { expression } => {
                if expression.trim().is_empty() {
                    return Err(TempoError::Schedule("cron expression required".into()));
                }
                cron::parse(expression)?;
            }
            ScheduleKind::Adaptive {
                base_interval,
                min_interval,
                max_interval,
                adaptation_factor,
            } => {
                if *base_interval <= 0.0 {
                    return Err(TempoError::Schedule(
                        "adaptive schedule requires base_interval > 0".into(),
                    ));
                }
                if *min_interval <= 0.0 || min_interval > max_interval {
                    return Err(TempoError::Schedule(
                        "adaptive schedule requires 0 < min_interval <= max_interval".into(),
                    ));
                }
                if *base_interval < *min_interval || *base_interval > *max_interval {
                    return Err(TempoError::Schedule(
                        "adaptive base_interval must lie within [min_interval, max_interval]"
                            .into(),
                    ));
                }
                if !(0.0..=1.0).contains(adaptation_factor) {
                    return Err(TempoError::Schedule(
                        "adaptation_factor must be within 0..=1".into(),
                    ));
                }
            }
            ScheduleKind::Conditional { conditions, .. } => {
                if conditions.is_empty() {
                    return Err(TempoError::Schedule(
                        "conditional schedule requires at least one condition".into(),
                    ));
                }
            }
            ScheduleKind::EventDriven { trigger_events } => {
                if trigger_events.is_empty() {
                    return Err(TempoError::Schedule(
                        "event_driven schedule requires at least one trigger event".into(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Partial update applied by `update_schedule`. Unset fields keep their
/// current values; a provided `kind` replaces the whole trigger payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub timezone: Option<String>,
    pub kind: Option<ScheduleKind>,
}

impl ScheduleUpdate {
    /// Merge into an existing config. The result must be revalidated.
    pub fn apply(self, config: &mut ScheduleConfig) {
        if let Some(name) = self.name {
            config.name = name;
        }
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(timezone) = self.timezone {
            config.timezone = Some(timezone);
        }
        if let Some(kind) = self.kind {
            config.kind = kind;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{CompareOp, ConditionKind};

    #[test]
    fn test_valid_interval() {
        assert!(ScheduleConfig::interval("s1", "every 5m", 5.0).validate().is_ok());
    }

    #[test]
    fn test_interval_rejects_bad_payload() {
        assert!(ScheduleConfig::interval("s1", "bad", 0.0).validate().is_err());
        let mut cfg = ScheduleConfig::interval("s1", "bad", 5.0);
        cfg.kind = ScheduleKind::Interval { minutes: 5.0, max_executions: Some(0) };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_missing_id_or_name() {
        assert!(ScheduleConfig::interval("", "x", 5.0).validate().is_err());
        assert!(ScheduleConfig::interval("x", "  ", 5.0).validate().is_err());
    }

    #[test]
    fn test_cron_expression_checked_at_validation() {
        assert!(ScheduleConfig::cron("c1", "daily", "0 8 * * *").validate().is_ok());
        assert!(ScheduleConfig::cron("c1", "daily", "").validate().is_err());
        assert!(ScheduleConfig::cron("c1", "daily", "not cron").validate().is_err());
    }

    #[test]
    fn test_timezone_checked_at_validation() {
        let mut cfg = ScheduleConfig::cron("c1", "daily", "0 8 * * *");
        cfg.timezone = Some("America/Bogota".into());
        assert!(cfg.validate().is_ok());
        cfg.timezone = Some("Nowhere/Land".into());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_adaptive_bounds() {
        assert!(ScheduleConfig::adaptive("a1", "a", 10.0, 5.0, 60.0, 0.3).validate().is_ok());
        assert!(ScheduleConfig::adaptive("a1", "a", 0.0, 5.0, 60.0, 0.3).validate().is_err());
        assert!(ScheduleConfig::adaptive("a1", "a", 10.0, 20.0, 15.0, 0.3).validate().is_err());
        assert!(ScheduleConfig::adaptive("a1", "a", 70.0, 5.0, 60.0, 0.3).validate().is_err());
        assert!(ScheduleConfig::adaptive("a1", "a", 10.0, 5.0, 60.0, 1.5).validate().is_err());
    }

    #[test]
    fn test_conditional_requires_conditions() {
        assert!(ScheduleConfig::conditional("c", "c", vec![], true).validate().is_err());
        let cond = Condition {
            id: "t".into(),
            operator: CompareOp::Gt,
            kind: ConditionKind::SystemHealth { metric: "overall_score".into(), threshold: 0.5 },
        };
        assert!(ScheduleConfig::conditional("c", "c", vec![cond], true).validate().is_ok());
    }

    #[test]
    fn test_event_driven_requires_events() {
        assert!(ScheduleConfig::event_driven("e", "e", vec![]).validate().is_err());
        assert!(
            ScheduleConfig::event_driven("e", "e", vec!["system:file_changed".into()])
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_update_merge() {
        let mut cfg = ScheduleConfig::interval("s1", "old", 5.0);
        let update = ScheduleUpdate {
            name: Some("new".into()),
            enabled: Some(false),
            ..Default::default()
        };
        update.apply(&mut cfg);
        assert_eq!(cfg.name, "new");
        assert!(!cfg.enabled);
        assert_eq!(cfg.kind.type_name(), "interval");
    }

    #[test]
    fn test_serde_round_trip() {
        let cfg = ScheduleConfig::interval("s1", "every 5m", 5.0);
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"type\":\"interval\""));
        let back: ScheduleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "s1");
        assert_eq!(back.kind.type_name(), "interval");
    }
}
