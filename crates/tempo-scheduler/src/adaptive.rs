//! Adaptive learning engine — converges adaptive schedules toward intervals
//! that correlate with successful, low-cost executions.
//!
//! Two loops feed off the same history:
//! - the live loop: after every firing, `record` + `next_interval` adjust the
//!   driver's next period from the blended adaptive score;
//! - the hourly analysis: `analyze` mines the history for optimal hours and
//!   metric correlations, publishing advisory recommendations. The analysis
//!   output is NOT consulted by `next_interval`.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleKind;

/// Rolling history cap per adaptive schedule; oldest entries evicted first.
pub const HISTORY_CAP: usize = 100;

/// An execution takes part in learning as a success when it finished under
/// this threshold.
pub const SUCCESS_THRESHOLD_MS: u64 = 5000;

/// One observed execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSample {
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub success: bool,
    /// Normalized system load at execution time, 0..1.
    pub system_load: f64,
    /// Overall philosophy score at execution time, 0..1.
    pub philosophy_score: f64,
}

/// Patterns mined from the execution history by the hourly analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningPatterns {
    /// Top-3 hours (0..23) with the most successful executions.
    pub optimal_times: Vec<u32>,
    /// Pearson correlation between system load and success.
    pub system_load_correlation: f64,
    /// Pearson correlation between philosophy score and success.
    pub philosophy_correlation: f64,
    pub seasonal_patterns: HashMap<String, f64>,
}

/// Advisory recommendations derived from the patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveRecommendations {
    /// Mean inter-arrival time of successful executions, in minutes.
    pub suggested_interval: f64,
    /// Two-hour windows starting at each optimal hour.
    pub optimal_time_windows: Vec<TimeWindow>,
    pub avoidance_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: u32,
    pub end: u32,
}

impl Default for AdaptiveRecommendations {
    fn default() -> Self {
        Self {
            suggested_interval: 60.0,
            optimal_time_windows: Vec::new(),
            avoidance_patterns: Vec::new(),
        }
    }
}

/// Per-schedule learning state. Created with the adaptive schedule, destroyed
/// with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveLearning {
    pub schedule_id: String,
    pub execution_history: VecDeque<ExecutionSample>,
    pub patterns: LearningPatterns,
    pub recommendations: AdaptiveRecommendations,
}

impl AdaptiveLearning {
    pub fn new(schedule_id: &str) -> Self {
        Self {
            schedule_id: schedule_id.to_string(),
            execution_history: VecDeque::new(),
            patterns: LearningPatterns::default(),
            recommendations: AdaptiveRecommendations::default(),
        }
    }

    /// Append a history entry, evicting the oldest past [`HISTORY_CAP`].
    pub fn record(&mut self, sample: ExecutionSample) {
        self.execution_history.push_back(sample);
        while self.execution_history.len() > HISTORY_CAP {
            self.execution_history.pop_front();
        }
    }

    /// Success rate over the last 10 samples; 0.5 when there is no history.
    pub fn recent_success_rate(&self) -> f64 {
        let len = self.execution_history.len();
        if len == 0 {
            return 0.5;
        }
        let recent: Vec<_> = self
            .execution_history
            .iter()
            .skip(len.saturating_sub(10))
            .collect();
        let successes = recent.iter().filter(|s| s.success).count();
        successes as f64 / recent.len() as f64
    }

    /// Blended adaptive score: 0.5·recent success + 0.3·load factor +
    /// 0.2·philosophy factor.
    pub fn adaptive_score(&self, load_factor: f64, philosophy_factor: f64) -> f64 {
        self.recent_success_rate() * 0.5 + load_factor * 0.3 + philosophy_factor * 0.2
    }

    /// Hourly analysis pass. Needs at least 10 samples; mines optimal hours
    /// and correlations, then derives recommendations. Returns true when the
    /// recommendations were recomputed.
    pub fn analyze(&mut self) -> bool {
        if self.execution_history.len() < 10 {
            return false;
        }

        let history: Vec<&ExecutionSample> = self.execution_history.iter().collect();
        let successful: Vec<&&ExecutionSample> = history.iter().filter(|s| s.success).collect();

        // Most frequent successful hours, top 3.
        let mut by_hour: HashMap<u32, u32> = HashMap::new();
        for sample in &successful {
            *by_hour.entry(sample.timestamp.hour()).or_insert(0) += 1;
        }
        let mut hours: Vec<(u32, u32)> = by_hour.into_iter().collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        self.patterns.optimal_times = hours.iter().take(3).map(|(h, _)| *h).collect();

        let outcomes: Vec<f64> = history
            .iter()
            .map(|s| if s.success { 1.0 } else { 0.0 })
            .collect();
        self.patterns.system_load_correlation = pearson(
            &history.iter().map(|s| s.system_load).collect::<Vec<_>>(),
            &outcomes,
        );
        self.patterns.philosophy_correlation = pearson(
            &history.iter().map(|s| s.philosophy_score).collect::<Vec<_>>(),
            &outcomes,
        );

        self.recommendations.suggested_interval = mean_successful_interval(&self.execution_history);
        self.recommendations.optimal_time_windows = self
            .patterns
            .optimal_times
            .iter()
            .map(|&h| TimeWindow { start: h, end: (h + 2) % 24 })
            .collect();

        let mut avoid = Vec::new();
        if self.patterns.system_load_correlation < -0.5 {
            avoid.push("high_system_load".to_string());
        }
        if self.patterns.philosophy_correlation < -0.3 {
            avoid.push("low_philosophy_score".to_string());
        }
        self.recommendations.avoidance_patterns = avoid;

        true
    }
}

/// Compute the next adaptive interval from the current one and the score:
/// shrink on high score, grow on low score, clamped to the configured bounds.
pub fn next_interval(score: f64, current: f64, kind: &ScheduleKind) -> f64 {
    let ScheduleKind::Adaptive { min_interval, max_interval, adaptation_factor, .. } = kind else {
        return current;
    };

    if score > 0.8 {
        (current * (1.0 - adaptation_factor)).max(*min_interval)
    } else if score < 0.4 {
        (current * (1.0 + adaptation_factor)).min(*max_interval)
    } else {
        current
    }
}

/// Pearson correlation coefficient; 0.0 for degenerate inputs.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.is_empty() {
        return 0.0;
    }
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Mean inter-arrival time of successful executions, in minutes. Defaults to
/// 60 with fewer than two successful data points.
fn mean_successful_interval(history: &VecDeque<ExecutionSample>) -> f64 {
    let successful: Vec<&ExecutionSample> = history.iter().filter(|s| s.success).collect();
    if successful.len() < 2 {
        return 60.0;
    }
    let mut total = 0.0;
    for pair in successful.windows(2) {
        let delta = pair[1].timestamp - pair[0].timestamp;
        total += delta.num_milliseconds() as f64 / 60_000.0;
    }
    total / (successful.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(
        minutes_ago: i64,
        execution_time_ms: u64,
        load: f64,
        philosophy: f64,
    ) -> ExecutionSample {
        ExecutionSample {
            timestamp: Utc::now() - chrono::Duration::minutes(minutes_ago),
            execution_time_ms,
            success: execution_time_ms < SUCCESS_THRESHOLD_MS,
            system_load: load,
            philosophy_score: philosophy,
        }
    }

    #[test]
    fn test_history_capped_at_100_most_recent() {
        let mut learning = AdaptiveLearning::new("s1");
        for i in 0..150u64 {
            let mut s = sample(0, i, 0.5, 0.5);
            s.execution_time_ms = i;
            learning.record(s);
        }
        assert_eq!(learning.execution_history.len(), HISTORY_CAP);
        // Most recent 100: execution times 50..=149.
        assert_eq!(learning.execution_history.front().unwrap().execution_time_ms, 50);
        assert_eq!(learning.execution_history.back().unwrap().execution_time_ms, 149);
    }

    #[test]
    fn test_recent_success_rate_defaults_and_window() {
        let learning = AdaptiveLearning::new("s1");
        assert_eq!(learning.recent_success_rate(), 0.5);

        let mut learning = AdaptiveLearning::new("s1");
        // 20 failures followed by 10 successes: window sees only successes.
        for _ in 0..20 {
            learning.record(sample(0, 9000, 0.5, 0.5));
        }
        for _ in 0..10 {
            learning.record(sample(0, 100, 0.5, 0.5));
        }
        assert_eq!(learning.recent_success_rate(), 1.0);
    }

    #[test]
    fn test_adaptive_score_blend() {
        let mut learning = AdaptiveLearning::new("s1");
        for _ in 0..10 {
            learning.record(sample(0, 100, 0.5, 0.5));
        }
        let score = learning.adaptive_score(0.7, 0.8);
        assert!((score - (1.0 * 0.5 + 0.7 * 0.3 + 0.8 * 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_next_interval_direction_and_clamping() {
        let kind = ScheduleKind::Adaptive {
            base_interval: 10.0,
            min_interval: 5.0,
            max_interval: 60.0,
            adaptation_factor: 0.3,
        };
        // High score shrinks, never below min.
        let shrunk = next_interval(0.9, 10.0, &kind);
        assert!(shrunk <= 10.0);
        assert!((shrunk - 7.0).abs() < 1e-9);
        assert_eq!(next_interval(0.9, 5.0, &kind), 5.0);
        // Low score grows, never above max.
        let grown = next_interval(0.2, 10.0, &kind);
        assert!(grown >= 10.0);
        assert!((grown - 13.0).abs() < 1e-9);
        assert_eq!(next_interval(0.2, 60.0, &kind), 60.0);
        // Mid scores leave it unchanged.
        assert_eq!(next_interval(0.6, 10.0, &kind), 10.0);
    }

    #[test]
    fn test_pearson_extremes() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-9);
        let inverse = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &inverse) + 1.0).abs() < 1e-9);
        assert_eq!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn test_analyze_needs_ten_samples() {
        let mut learning = AdaptiveLearning::new("s1");
        for _ in 0..9 {
            learning.record(sample(0, 100, 0.5, 0.5));
        }
        assert!(!learning.analyze());
        learning.record(sample(0, 100, 0.5, 0.5));
        assert!(learning.analyze());
    }

    #[test]
    fn test_analyze_derives_recommendations() {
        let mut learning = AdaptiveLearning::new("s1");
        let base = Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap();
        // Successful executions every 30 minutes at hour 9/10, with high load
        // correlating strongly against success.
        for i in 0..12i64 {
            let success = i % 2 == 0;
            learning.record(ExecutionSample {
                timestamp: base + chrono::Duration::minutes(i * 30),
                execution_time_ms: if success { 100 } else { 9000 },
                success,
                system_load: if success { 0.2 } else { 0.9 },
                philosophy_score: 0.8,
            });
        }
        assert!(learning.analyze());
        assert!(!learning.patterns.optimal_times.is_empty());
        assert!(learning.patterns.system_load_correlation < -0.5);
        assert!(
            learning
                .recommendations
                .avoidance_patterns
                .contains(&"high_system_load".to_string())
        );
        // Successes are 60 minutes apart.
        assert!((learning.recommendations.suggested_interval - 60.0).abs() < 1e-6);
        for w in &learning.recommendations.optimal_time_windows {
            assert_eq!(w.end, (w.start + 2) % 24);
        }
    }

    #[test]
    fn test_suggested_interval_default() {
        let mut learning = AdaptiveLearning::new("s1");
        for _ in 0..10 {
            learning.record(sample(0, 9000, 0.5, 0.5));
        }
        learning.analyze();
        assert_eq!(learning.recommendations.suggested_interval, 60.0);
    }
}
