//! Condition evaluation for conditional schedules.
//!
//! Each condition is an independent predicate over host metrics; a conditional
//! schedule combines its conditions with AND (`require_all`) or OR semantics.
//! Custom predicates are fail-closed: any error evaluates to false and is
//! reported through the event stream.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tempo_core::{ChangeKind, MetricsProvider, Result, TempoError};

/// Caller-supplied predicate for `custom` conditions.
pub type CustomEvaluator = Arc<dyn Fn(&serde_json::Value) -> Result<bool> + Send + Sync>;

/// Comparison operator shared by all metric-valued conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    Contains,
    Matches,
}

impl CompareOp {
    /// Numeric comparison. `contains`/`matches` fall back to the decimal
    /// string forms of both sides.
    pub fn compare_f64(self, value: f64, threshold: f64) -> bool {
        match self {
            CompareOp::Gt => value > threshold,
            CompareOp::Lt => value < threshold,
            CompareOp::Eq => (value - threshold).abs() < f64::EPSILON,
            CompareOp::Gte => value >= threshold,
            CompareOp::Lte => value <= threshold,
            CompareOp::Contains | CompareOp::Matches => {
                self.compare_str(&value.to_string(), &threshold.to_string())
            }
        }
    }

    /// String comparison. `matches` treats the threshold as a regex; an
    /// invalid regex never matches.
    pub fn compare_str(self, value: &str, threshold: &str) -> bool {
        match self {
            CompareOp::Eq => value == threshold,
            CompareOp::Contains => value.contains(threshold),
            CompareOp::Matches => Regex::new(threshold)
                .map(|re| re.is_match(value))
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Which file-change kinds a `file_changes` condition considers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeFilter {
    #[default]
    Any,
    Add,
    Modify,
    Delete,
}

impl ChangeFilter {
    fn accepts(self, kind: ChangeKind) -> bool {
        match self {
            ChangeFilter::Any => true,
            ChangeFilter::Add => kind == ChangeKind::Add,
            ChangeFilter::Modify => kind == ChangeKind::Modify,
            ChangeFilter::Delete => kind == ChangeKind::Delete,
        }
    }
}

/// A predicate attached to a conditional schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    /// Identifies the condition in `condition:evaluation_failed` events.
    pub id: String,
    pub operator: CompareOp,
    #[serde(flatten)]
    pub kind: ConditionKind,
}

/// Type-specific condition payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionKind {
    /// Compare a named system health metric against a threshold.
    SystemHealth { metric: String, threshold: f64 },
    /// Compare the overall philosophy score, or a named principle's score.
    PhilosophyScore {
        #[serde(default)]
        principle: Option<String>,
        threshold: f64,
    },
    /// Compare a named metric of a specific guardian.
    GuardianPerformance {
        guardian: String,
        metric: String,
        threshold: f64,
    },
    /// Current hour within [start_hour, end_hour] (wrapping past midnight) AND
    /// current weekday in `days_of_week` (0 = Sunday).
    TimeRange {
        start_hour: u32,
        end_hour: u32,
        days_of_week: Vec<u32>,
    },
    /// Any file changed within `since_minutes` (filtered by kind) matches one
    /// of `patterns` (substring or regex).
    FileChanges {
        patterns: Vec<String>,
        since_minutes: u32,
        #[serde(default)]
        change_type: ChangeFilter,
    },
    /// Delegates to a registered named evaluator. Fail-closed on error.
    Custom {
        evaluator: String,
        #[serde(default)]
        parameters: serde_json::Value,
    },
}

/// Evaluate one condition. Only `custom` conditions can return an error; the
/// engine converts it into a `condition:evaluation_failed` event and treats
/// the condition as false.
pub fn evaluate(
    condition: &Condition,
    metrics: &dyn MetricsProvider,
    custom: &HashMap<String, CustomEvaluator>,
    now: DateTime<Local>,
) -> Result<bool> {
    match &condition.kind {
        ConditionKind::SystemHealth { metric, threshold } => {
            let health = metrics.system_health();
            Ok(health
                .metric(metric)
                .is_some_and(|v| condition.operator.compare_f64(v, *threshold)))
        }
        ConditionKind::PhilosophyScore { principle, threshold } => {
            let scores = metrics.philosophy();
            Ok(scores
                .score(principle.as_deref())
                .is_some_and(|v| condition.operator.compare_f64(v, *threshold)))
        }
        ConditionKind::GuardianPerformance { guardian, metric, threshold } => {
            Ok(metrics
                .guardian(guardian)
                .and_then(|g| g.metric(metric))
                .is_some_and(|v| condition.operator.compare_f64(v, *threshold)))
        }
        ConditionKind::TimeRange { start_hour, end_hour, days_of_week } => {
            Ok(in_time_range(now, *start_hour, *end_hour, days_of_week))
        }
        ConditionKind::FileChanges { patterns, since_minutes, change_type } => {
            let changes = metrics.recent_file_changes(*since_minutes);
            Ok(changes
                .iter()
                .filter(|c| change_type.accepts(c.kind))
                .any(|c| patterns.iter().any(|p| path_matches(&c.path, p))))
        }
        ConditionKind::Custom { evaluator, parameters } => {
            let f = custom.get(evaluator).ok_or_else(|| {
                TempoError::Condition(format!("unknown custom evaluator '{evaluator}'"))
            })?;
            f(parameters)
        }
    }
}

/// Combine per-condition results with AND/OR semantics.
pub fn combine(results: &[bool], require_all: bool) -> bool {
    if results.is_empty() {
        return false;
    }
    if require_all {
        results.iter().all(|r| *r)
    } else {
        results.iter().any(|r| *r)
    }
}

fn in_time_range(now: DateTime<Local>, start_hour: u32, end_hour: u32, days: &[u32]) -> bool {
    let weekday = now.weekday().num_days_from_sunday();
    if !days.contains(&weekday) {
        return false;
    }
    let hour = now.hour();
    if start_hour <= end_hour {
        hour >= start_hour && hour <= end_hour
    } else {
        // Range wraps past midnight, e.g. 22..6.
        hour >= start_hour || hour <= end_hour
    }
}

fn path_matches(path: &str, pattern: &str) -> bool {
    path.contains(pattern)
        || Regex::new(pattern).map(|re| re.is_match(path)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempo_core::{FileChange, StaticMetrics};

    fn local(hour: u32) -> DateTime<Local> {
        // 2026-03-04 is a Wednesday (weekday 3).
        Local.with_ymd_and_hms(2026, 3, 4, hour, 15, 0).unwrap()
    }

    #[test]
    fn test_compare_ops() {
        assert!(CompareOp::Gt.compare_f64(0.9, 0.8));
        assert!(!CompareOp::Gt.compare_f64(0.8, 0.8));
        assert!(CompareOp::Gte.compare_f64(0.8, 0.8));
        assert!(CompareOp::Lt.compare_f64(0.1, 0.2));
        assert!(CompareOp::Lte.compare_f64(0.2, 0.2));
        assert!(CompareOp::Eq.compare_f64(0.5, 0.5));
        assert!(CompareOp::Contains.compare_str("src/app.rs", "app"));
        assert!(CompareOp::Matches.compare_str("src/app.rs", r"\.rs$"));
        assert!(!CompareOp::Matches.compare_str("src/app.rs", "["));
    }

    #[test]
    fn test_system_health_condition() {
        let metrics = StaticMetrics::default();
        let custom = HashMap::new();
        let cond = Condition {
            id: "c1".into(),
            operator: CompareOp::Gt,
            kind: ConditionKind::SystemHealth { metric: "overall_score".into(), threshold: 0.8 },
        };
        assert!(evaluate(&cond, &metrics, &custom, local(10)).unwrap());

        let cond = Condition {
            id: "c2".into(),
            operator: CompareOp::Gt,
            kind: ConditionKind::SystemHealth { metric: "unknown".into(), threshold: 0.0 },
        };
        assert!(!evaluate(&cond, &metrics, &custom, local(10)).unwrap());
    }

    #[test]
    fn test_philosophy_condition_principle_and_overall() {
        let metrics = StaticMetrics::default();
        let custom = HashMap::new();
        let overall = Condition {
            id: "c".into(),
            operator: CompareOp::Gte,
            kind: ConditionKind::PhilosophyScore { principle: None, threshold: 0.82 },
        };
        assert!(evaluate(&overall, &metrics, &custom, local(10)).unwrap());

        let principle = Condition {
            id: "c".into(),
            operator: CompareOp::Lt,
            kind: ConditionKind::PhilosophyScore {
                principle: Some("ayni".into()),
                threshold: 0.8,
            },
        };
        assert!(evaluate(&principle, &metrics, &custom, local(10)).unwrap());
    }

    #[test]
    fn test_guardian_condition() {
        let metrics = StaticMetrics::default();
        let custom = HashMap::new();
        let cond = Condition {
            id: "c".into(),
            operator: CompareOp::Gt,
            kind: ConditionKind::GuardianPerformance {
                guardian: "performance".into(),
                metric: "success_rate".into(),
                threshold: 0.9,
            },
        };
        assert!(evaluate(&cond, &metrics, &custom, local(10)).unwrap());

        let unknown = Condition {
            id: "c".into(),
            operator: CompareOp::Gt,
            kind: ConditionKind::GuardianPerformance {
                guardian: "nope".into(),
                metric: "success_rate".into(),
                threshold: 0.0,
            },
        };
        assert!(!evaluate(&unknown, &metrics, &custom, local(10)).unwrap());
    }

    #[test]
    fn test_time_range_plain_and_wrapping() {
        let all_days: Vec<u32> = (0..7).collect();
        assert!(in_time_range(local(10), 9, 17, &all_days));
        assert!(!in_time_range(local(8), 9, 17, &all_days));
        // Wrap past midnight: 22..6.
        assert!(in_time_range(local(23), 22, 6, &all_days));
        assert!(in_time_range(local(3), 22, 6, &all_days));
        assert!(!in_time_range(local(12), 22, 6, &all_days));
        // Wrong weekday.
        assert!(!in_time_range(local(10), 0, 23, &[0, 6]));
    }

    #[test]
    fn test_file_changes_condition() {
        let mut metrics = StaticMetrics::default();
        metrics.file_changes = vec![FileChange {
            path: "src/components/Dashboard.tsx".into(),
            kind: ChangeKind::Modify,
            changed_at: chrono::Utc::now(),
        }];
        let custom = HashMap::new();

        let hit = Condition {
            id: "c".into(),
            operator: CompareOp::Contains,
            kind: ConditionKind::FileChanges {
                patterns: vec!["components".into()],
                since_minutes: 30,
                change_type: ChangeFilter::Modify,
            },
        };
        assert!(evaluate(&hit, &metrics, &custom, local(10)).unwrap());

        let wrong_kind = Condition {
            id: "c".into(),
            operator: CompareOp::Contains,
            kind: ConditionKind::FileChanges {
                patterns: vec!["components".into()],
                since_minutes: 30,
                change_type: ChangeFilter::Delete,
            },
        };
        assert!(!evaluate(&wrong_kind, &metrics, &custom, local(10)).unwrap());
    }

    #[test]
    fn test_custom_condition_and_fail_closed() {
        let metrics = StaticMetrics::default();
        let mut custom: HashMap<String, CustomEvaluator> = HashMap::new();
        custom.insert(
            "always".into(),
            Arc::new(|_params| Ok(true)),
        );
        custom.insert(
            "broken".into(),
            Arc::new(|_params| Err(TempoError::Condition("boom".into()))),
        );

        let ok = Condition {
            id: "c".into(),
            operator: CompareOp::Eq,
            kind: ConditionKind::Custom {
                evaluator: "always".into(),
                parameters: serde_json::json!({}),
            },
        };
        assert!(evaluate(&ok, &metrics, &custom, local(10)).unwrap());

        let broken = Condition {
            id: "c".into(),
            operator: CompareOp::Eq,
            kind: ConditionKind::Custom {
                evaluator: "broken".into(),
                parameters: serde_json::json!({}),
            },
        };
        assert!(evaluate(&broken, &metrics, &custom, local(10)).is_err());

        let missing = Condition {
            id: "c".into(),
            operator: CompareOp::Eq,
            kind: ConditionKind::Custom {
                evaluator: "missing".into(),
                parameters: serde_json::json!({}),
            },
        };
        assert!(evaluate(&missing, &metrics, &custom, local(10)).is_err());
    }

    #[test]
    fn test_combine_semantics() {
        assert!(combine(&[true, true], true));
        assert!(!combine(&[true, false], true));
        assert!(combine(&[true, false], false));
        assert!(!combine(&[false, false], false));
        assert!(!combine(&[], true));
        assert!(!combine(&[], false));
    }
}
