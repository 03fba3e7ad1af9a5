//! Aggregate scheduler statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Running per-type performance, updated with incremental means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypePerformance {
    pub executions: u64,
    /// Running success rate, 0..1.
    pub success_rate: f64,
    /// Running average latency of successful executions, in milliseconds.
    pub average_latency: f64,
}

impl TypePerformance {
    /// Fold one execution outcome in. Failed executions count toward the
    /// success rate but not the latency average.
    pub fn record(&mut self, execution_time_ms: u64, success: bool) {
        self.executions += 1;
        let n = self.executions as f64;
        if success {
            self.success_rate = (self.success_rate * (n - 1.0) + 1.0) / n;
            self.average_latency =
                (self.average_latency * (n - 1.0) + execution_time_ms as f64) / n;
        } else {
            self.success_rate = (self.success_rate * (n - 1.0)) / n;
        }
    }
}

/// Process-wide aggregate counters, lifetime = scheduler lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub total_schedules: u32,
    pub active_schedules: u32,
    pub total_executions: u64,
    pub successful_executions: u64,
    /// Firings suppressed by the per-schedule in-flight guard.
    pub skipped_executions: u64,
    /// Running average of successful execution times, milliseconds.
    pub average_execution_time: f64,
    pub adaptive_adjustments: u64,
    pub condition_evaluations: u64,
    pub type_distribution: HashMap<String, u32>,
    pub performance_by_type: HashMap<String, TypePerformance>,
}

impl SchedulerStats {
    pub fn record_execution(&mut self, type_name: &str, execution_time_ms: u64, success: bool) {
        if success {
            self.total_executions += 1;
            self.successful_executions += 1;
            let n = self.successful_executions as f64;
            self.average_execution_time =
                (self.average_execution_time * (n - 1.0) + execution_time_ms as f64) / n;
        }
        self.performance_by_type
            .entry(type_name.to_string())
            .or_default()
            .record(execution_time_ms, success);
    }

    pub fn add_schedule(&mut self, type_name: &str) {
        self.total_schedules += 1;
        *self.type_distribution.entry(type_name.to_string()).or_insert(0) += 1;
    }

    pub fn remove_schedule(&mut self, type_name: &str) {
        self.total_schedules = self.total_schedules.saturating_sub(1);
        if let Some(count) = self.type_distribution.get_mut(type_name) {
            *count = count.saturating_sub(1);
        }
    }
}
