//! Scheduler engine — the registry, the trigger drivers, and the execution
//! engine that turns firings into tracked execution records.
//!
//! One `Scheduler` owns all state (no ambient/static collections): schedule
//! registry, per-schedule driver tasks, execution history, adaptive learning
//! state, and aggregate stats. Drivers are plain tokio tasks; the conditional
//! poller and the hourly learning analysis are two more shared tasks started
//! and stopped with the scheduler.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use tempo_core::{MetricsProvider, PipelineExecutor, Result, TempoError};

use crate::adaptive::{self, AdaptiveLearning, ExecutionSample, SUCCESS_THRESHOLD_MS};
use crate::condition::{self, CustomEvaluator};
use crate::cron;
use crate::events::{EventKind, SchedulerEvent, SystemEvent};
use crate::execution::{ExecutionStatus, ScheduledExecution, TriggerKind};
use crate::schedule::{ScheduleConfig, ScheduleKind, ScheduleUpdate};
use crate::stats::SchedulerStats;

/// Shared conditional poller tick. Every enabled conditional schedule is
/// re-evaluated on each tick, with no debouncing.
pub const CONDITION_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Cadence of the adaptive learning analysis pass.
pub const LEARNING_ANALYSIS_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Execution records retained per schedule; oldest evicted first.
pub const EXECUTION_HISTORY_CAP: usize = 200;

struct ScheduleEntry {
    config: ScheduleConfig,
    pipeline_id: String,
}

#[derive(Default)]
struct Inner {
    running: bool,
    /// Registration order — the conditional poller evaluates in this order.
    schedules: Vec<ScheduleEntry>,
    /// Driver tasks for interval/cron/adaptive schedules, keyed by schedule id.
    drivers: HashMap<String, JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
    analyzer: Option<JoinHandle<()>>,
    history: HashMap<String, VecDeque<ScheduledExecution>>,
    learning: HashMap<String, AdaptiveLearning>,
    custom: HashMap<String, CustomEvaluator>,
    /// Schedule ids with a pipeline execution currently in progress.
    in_flight: HashSet<String>,
    /// Schedule ids currently counted in `stats.active_schedules`. A retired
    /// driver (interval cap reached, cron exhausted) leaves its schedule
    /// enabled but not active, so all counter changes gate on this set.
    active: HashSet<String>,
    stats: SchedulerStats,
}

fn sync_active_count(inner: &mut Inner) {
    inner.stats.active_schedules = inner.active.len() as u32;
}

fn push_history(inner: &mut Inner, execution: ScheduledExecution) {
    let queue = inner.history.entry(execution.schedule_id.clone()).or_default();
    queue.push_back(execution);
    while queue.len() > EXECUTION_HISTORY_CAP {
        queue.pop_front();
    }
}

/// The scheduler. Cheap to clone — all fields are shared handles; driver
/// tasks hold clones of the whole thing.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<SchedulerEvent>,
    pipeline: Arc<dyn PipelineExecutor>,
    metrics: Arc<dyn MetricsProvider>,
}

impl Scheduler {
    pub fn new(pipeline: Arc<dyn PipelineExecutor>, metrics: Arc<dyn MetricsProvider>) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            events,
            pipeline,
            metrics,
        }
    }

    /// Subscribe to the scheduler event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, kind: EventKind) {
        let _ = self.events.send(SchedulerEvent::now(kind));
    }

    /// Register a named evaluator for `custom` conditions.
    pub async fn register_custom_condition(&self, name: &str, evaluator: CustomEvaluator) {
        let mut inner = self.inner.lock().await;
        inner.custom.insert(name.to_string(), evaluator);
    }

    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.running
    }

    /// Activate all enabled schedules' drivers plus the conditional poller and
    /// the learning analysis task. No-op when already running.
    pub async fn start(&self) {
        let mut inner = self.inner.lock().await;
        if inner.running {
            return;
        }
        inner.running = true;

        let enabled: Vec<ScheduleConfig> = inner
            .schedules
            .iter()
            .filter(|e| e.config.enabled)
            .map(|e| e.config.clone())
            .collect();
        for config in &enabled {
            self.spawn_driver_locked(&mut inner, config);
            inner.active.insert(config.id.clone());
        }
        sync_active_count(&mut inner);

        inner.poller = Some(self.spawn_conditional_poller());
        inner.analyzer = Some(self.spawn_learning_analyzer());
        let active = enabled.len();
        drop(inner);

        self.emit(EventKind::SchedulerStarted);
        tracing::info!("⏰ Scheduler started ({} active schedules)", active);
    }

    /// Halt all drivers and shared tasks. No-op when already stopped.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if !inner.running {
            return;
        }
        inner.running = false;
        for (_, handle) in inner.drivers.drain() {
            handle.abort();
        }
        if let Some(poller) = inner.poller.take() {
            poller.abort();
        }
        if let Some(analyzer) = inner.analyzer.take() {
            analyzer.abort();
        }
        inner.in_flight.clear();
        inner.active.clear();
        sync_active_count(&mut inner);
        drop(inner);

        self.emit(EventKind::SchedulerStopped);
        tracing::info!("⏹️ Scheduler stopped");
    }

    /// Register a schedule bound to a pipeline. Fails synchronously on a
    /// duplicate id or malformed config; the registry is left unchanged.
    pub async fn create_schedule(
        &self,
        config: ScheduleConfig,
        pipeline_id: &str,
    ) -> Result<String> {
        config.validate()?;

        let mut inner = self.inner.lock().await;
        if inner.schedules.iter().any(|e| e.config.id == config.id) {
            return Err(TempoError::Schedule(format!(
                "schedule id '{}' already exists",
                config.id
            )));
        }

        let id = config.id.clone();
        let name = config.name.clone();
        inner.stats.add_schedule(config.kind.type_name());
        if matches!(config.kind, ScheduleKind::Adaptive { .. }) {
            inner.learning.insert(id.clone(), AdaptiveLearning::new(&id));
        }

        let start_now = inner.running && config.enabled;
        inner.schedules.push(ScheduleEntry {
            config: config.clone(),
            pipeline_id: pipeline_id.to_string(),
        });
        if start_now {
            self.spawn_driver_locked(&mut inner, &config);
            inner.active.insert(id.clone());
            sync_active_count(&mut inner);
        }
        drop(inner);

        self.emit(EventKind::ScheduleCreated {
            schedule_id: id.clone(),
            pipeline_id: pipeline_id.to_string(),
        });
        tracing::info!("📅 Schedule created: '{}' ({})", name, id);
        Ok(id)
    }

    /// Merge a partial update, revalidate, and restart the driver. Returns
    /// Ok(false) for an unknown id; Err when the merged config is invalid (the
    /// stored config is left unchanged).
    pub async fn update_schedule(&self, schedule_id: &str, update: ScheduleUpdate) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let Some(pos) = inner.schedules.iter().position(|e| e.config.id == schedule_id) else {
            return Ok(false);
        };

        let old = inner.schedules[pos].config.clone();
        let mut merged = old.clone();
        update.apply(&mut merged);
        merged.validate()?;

        stop_driver_locked(&mut inner, schedule_id);
        inner.active.remove(schedule_id);

        let old_type = old.kind.type_name();
        let new_type = merged.kind.type_name();
        if old_type != new_type {
            if let Some(count) = inner.stats.type_distribution.get_mut(old_type) {
                *count = count.saturating_sub(1);
            }
            *inner
                .stats
                .type_distribution
                .entry(new_type.to_string())
                .or_insert(0) += 1;
            if new_type == "adaptive" {
                inner
                    .learning
                    .insert(schedule_id.to_string(), AdaptiveLearning::new(schedule_id));
            } else if old_type == "adaptive" {
                inner.learning.remove(schedule_id);
            }
        }

        inner.schedules[pos].config = merged.clone();
        if inner.running && merged.enabled {
            self.spawn_driver_locked(&mut inner, &merged);
            inner.active.insert(schedule_id.to_string());
        }
        sync_active_count(&mut inner);
        drop(inner);

        self.emit(EventKind::ScheduleUpdated { schedule_id: schedule_id.to_string() });
        tracing::info!("⚙️ Schedule updated: {}", schedule_id);
        Ok(true)
    }

    /// Remove a schedule, its driver, and its learning state. Execution
    /// history is retained. Returns false for an unknown id.
    pub async fn delete_schedule(&self, schedule_id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(pos) = inner.schedules.iter().position(|e| e.config.id == schedule_id) else {
            return false;
        };

        let entry = inner.schedules.remove(pos);
        stop_driver_locked(&mut inner, schedule_id);
        inner.active.remove(schedule_id);
        sync_active_count(&mut inner);
        inner.stats.remove_schedule(entry.config.kind.type_name());
        inner.learning.remove(schedule_id);
        drop(inner);

        self.emit(EventKind::ScheduleDeleted { schedule_id: schedule_id.to_string() });
        tracing::info!("🗑️ Schedule deleted: {}", schedule_id);
        true
    }

    /// Disable a schedule and stop its driver, keeping the stored config.
    /// Returns false for an unknown id.
    pub async fn pause_schedule(&self, schedule_id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(entry) = inner
            .schedules
            .iter_mut()
            .find(|e| e.config.id == schedule_id)
        else {
            return false;
        };

        entry.config.enabled = false;
        stop_driver_locked(&mut inner, schedule_id);
        inner.active.remove(schedule_id);
        sync_active_count(&mut inner);
        drop(inner);

        self.emit(EventKind::SchedulePaused { schedule_id: schedule_id.to_string() });
        true
    }

    /// Re-enable a paused schedule and restart its driver if the scheduler is
    /// running. Returns false for an unknown id.
    pub async fn resume_schedule(&self, schedule_id: &str) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(entry) = inner
            .schedules
            .iter_mut()
            .find(|e| e.config.id == schedule_id)
        else {
            return false;
        };

        entry.config.enabled = true;
        let config = entry.config.clone();
        // Also revives a schedule whose driver retired itself while enabled.
        if inner.running && !inner.active.contains(schedule_id) {
            self.spawn_driver_locked(&mut inner, &config);
            inner.active.insert(schedule_id.to_string());
            sync_active_count(&mut inner);
        }
        drop(inner);

        self.emit(EventKind::ScheduleResumed { schedule_id: schedule_id.to_string() });
        true
    }

    /// Deliver a host system event, firing every enabled event_driven
    /// schedule subscribed to it.
    pub async fn emit_system_event(&self, event: SystemEvent) {
        let ids: Vec<String> = {
            let inner = self.inner.lock().await;
            inner
                .schedules
                .iter()
                .filter(|e| e.config.enabled)
                .filter(|e| match &e.config.kind {
                    ScheduleKind::EventDriven { trigger_events } => {
                        trigger_events.iter().any(|t| t == event.name())
                    }
                    _ => false,
                })
                .map(|e| e.config.id.clone())
                .collect()
        };

        for id in ids {
            self.fire(&id, TriggerKind::EventDriven).await;
        }
    }

    // ---- Getters ----

    pub async fn schedules(&self) -> Vec<ScheduleConfig> {
        let inner = self.inner.lock().await;
        inner.schedules.iter().map(|e| e.config.clone()).collect()
    }

    /// Execution records, newest last. With `None`, records for all schedules
    /// (including deleted ones) ordered by scheduled time.
    pub async fn execution_history(&self, schedule_id: Option<&str>) -> Vec<ScheduledExecution> {
        let inner = self.inner.lock().await;
        match schedule_id {
            Some(id) => inner
                .history
                .get(id)
                .map(|q| q.iter().cloned().collect())
                .unwrap_or_default(),
            None => {
                let mut all: Vec<ScheduledExecution> =
                    inner.history.values().flatten().cloned().collect();
                all.sort_by_key(|e| e.scheduled_time);
                all
            }
        }
    }

    pub async fn adaptive_learning(&self, schedule_id: &str) -> Option<AdaptiveLearning> {
        let inner = self.inner.lock().await;
        inner.learning.get(schedule_id).cloned()
    }

    pub async fn stats(&self) -> SchedulerStats {
        let inner = self.inner.lock().await;
        inner.stats.clone()
    }

    // ---- Execution engine ----

    /// Turn a trigger firing into exactly one tracked execution record.
    /// Pipeline failures never propagate past this boundary.
    pub(crate) async fn fire(&self, schedule_id: &str, trigger: TriggerKind) {
        let (pipeline_id, type_name, execution_id) = {
            let mut inner = self.inner.lock().await;
            let Some(entry) = inner.schedules.iter().find(|e| e.config.id == schedule_id)
            else {
                tracing::warn!(
                    "⚠️ Trigger fired for unknown schedule '{}', ignoring",
                    schedule_id
                );
                return;
            };
            let pipeline_id = entry.pipeline_id.clone();
            let type_name = entry.config.kind.type_name();

            let score = match inner.learning.get(schedule_id) {
                Some(learning) => learning
                    .adaptive_score(self.metrics.system_load(), self.metrics.philosophy().overall),
                None => 0.5,
            };

            let mut execution =
                ScheduledExecution::new(schedule_id, &pipeline_id, trigger, score);

            // In-flight guard: a firing that overlaps a still-running
            // execution of the same schedule is skipped, not queued.
            if inner.in_flight.contains(schedule_id) {
                execution.status = ExecutionStatus::Skipped;
                let execution_id = execution.id.clone();
                push_history(&mut inner, execution);
                inner.stats.skipped_executions += 1;
                drop(inner);
                self.emit(EventKind::ExecutionSkipped {
                    schedule_id: schedule_id.to_string(),
                    execution_id,
                });
                tracing::debug!("⏭️ Overlapping fire skipped: {}", schedule_id);
                return;
            }

            execution.status = ExecutionStatus::Running;
            execution.actual_time = Some(Utc::now());
            let execution_id = execution.id.clone();
            inner.in_flight.insert(schedule_id.to_string());
            push_history(&mut inner, execution);
            (pipeline_id, type_name, execution_id)
        };

        let started = Instant::now();
        let result = self.pipeline.execute(&pipeline_id).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let event = {
            let mut inner = self.inner.lock().await;
            inner.in_flight.remove(schedule_id);
            let record = inner
                .history
                .get_mut(schedule_id)
                .and_then(|q| q.iter_mut().find(|e| e.id == execution_id));
            let Some(record) = record else {
                tracing::warn!("⚠️ Execution record '{}' evicted mid-run", execution_id);
                return;
            };
            match result {
                Ok(()) => {
                    record.status = ExecutionStatus::Completed;
                    record.execution_time_ms = Some(elapsed_ms);
                    let execution = record.clone();
                    inner.stats.record_execution(type_name, elapsed_ms, true);
                    EventKind::ExecutionCompleted { execution }
                }
                Err(e) => {
                    record.status = ExecutionStatus::Failed;
                    record.reason = Some(e.to_string());
                    let execution = record.clone();
                    inner.stats.record_execution(type_name, 0, false);
                    tracing::warn!("❌ Execution failed for '{}': {}", schedule_id, e);
                    EventKind::ExecutionFailed { execution, error: e.to_string() }
                }
            }
        };
        self.emit(event);
    }

    // ---- Trigger drivers ----

    fn spawn_driver_locked(&self, inner: &mut Inner, config: &ScheduleConfig) {
        let handle = match &config.kind {
            ScheduleKind::Interval { minutes, max_executions } => {
                Some(self.spawn_interval_driver(&config.id, *minutes, *max_executions))
            }
            ScheduleKind::Cron { expression } => Some(self.spawn_cron_driver(
                &config.id,
                expression.clone(),
                config.timezone.clone(),
            )),
            ScheduleKind::Adaptive { .. } => {
                Some(self.spawn_adaptive_driver(&config.id, config.kind.clone()))
            }
            // Conditional schedules ride the shared poller; event_driven
            // schedules have no timer at all.
            ScheduleKind::Conditional { .. } | ScheduleKind::EventDriven { .. } => None,
        };
        if let Some(handle) = handle {
            if let Some(old) = inner.drivers.insert(config.id.clone(), handle) {
                old.abort();
            }
        }
    }

    /// Repeating fixed-period timer. With `max_executions` set, the driver
    /// retires itself right after the Nth firing.
    fn spawn_interval_driver(
        &self,
        schedule_id: &str,
        minutes: f64,
        max_executions: Option<u32>,
    ) -> JoinHandle<()> {
        let sched = self.clone();
        let id = schedule_id.to_string();
        tokio::spawn(async move {
            let period = Duration::from_secs_f64(minutes * 60.0);
            let mut ticker = time::interval_at(Instant::now() + period, period);
            let mut fired = 0u32;
            loop {
                ticker.tick().await;
                // Spawned so a slow pipeline overlaps the next tick and hits
                // the in-flight guard instead of delaying it.
                let run = sched.clone();
                let run_id = id.clone();
                tokio::spawn(async move { run.fire(&run_id, TriggerKind::Interval).await });
                fired += 1;
                if let Some(max) = max_executions {
                    if fired >= max {
                        sched.retire_driver(&id).await;
                        break;
                    }
                }
            }
        })
    }

    /// Sleeps until the expression's next fire time, evaluated in the
    /// schedule's timezone.
    fn spawn_cron_driver(
        &self,
        schedule_id: &str,
        expression: String,
        timezone: Option<String>,
    ) -> JoinHandle<()> {
        let sched = self.clone();
        let id = schedule_id.to_string();
        tokio::spawn(async move {
            loop {
                let next = match cron::next_fire(&expression, timezone.as_deref(), Utc::now()) {
                    Ok(Some(next)) => next,
                    Ok(None) => {
                        tracing::warn!("🕐 Cron schedule '{}' has no future fire time", id);
                        sched.retire_driver(&id).await;
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("⚠️ Cron schedule '{}' stopped: {}", id, e);
                        sched.retire_driver(&id).await;
                        break;
                    }
                };
                let delay = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                time::sleep(delay).await;
                let run = sched.clone();
                let run_id = id.clone();
                tokio::spawn(async move { run.fire(&run_id, TriggerKind::Cron).await });
            }
        })
    }

    /// Self-rescheduling single-shot timer: the period is recomputed from the
    /// adaptive score after every firing.
    fn spawn_adaptive_driver(&self, schedule_id: &str, kind: ScheduleKind) -> JoinHandle<()> {
        let sched = self.clone();
        let id = schedule_id.to_string();
        tokio::spawn(async move {
            let ScheduleKind::Adaptive { base_interval, .. } = kind else {
                return;
            };
            let mut current = base_interval;
            loop {
                time::sleep(Duration::from_secs_f64(current * 60.0)).await;
                let started = Instant::now();
                sched.fire(&id, TriggerKind::Adaptive).await;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                current = sched.update_adaptive(&id, elapsed_ms, current, &kind).await;
            }
        })
    }

    /// Record an adaptive execution sample and compute the driver's next
    /// interval from the blended score.
    async fn update_adaptive(
        &self,
        schedule_id: &str,
        elapsed_ms: u64,
        current: f64,
        kind: &ScheduleKind,
    ) -> f64 {
        let load = self.metrics.system_load();
        let philosophy = self.metrics.philosophy().overall;

        let mut inner = self.inner.lock().await;
        let Some(learning) = inner.learning.get_mut(schedule_id) else {
            return current;
        };
        learning.record(ExecutionSample {
            timestamp: Utc::now(),
            execution_time_ms: elapsed_ms,
            success: elapsed_ms < SUCCESS_THRESHOLD_MS,
            system_load: load,
            philosophy_score: philosophy,
        });
        let score = learning.adaptive_score(load, philosophy);
        inner.stats.adaptive_adjustments += 1;

        let next = adaptive::next_interval(score, current, kind);
        if (next - current).abs() > f64::EPSILON {
            tracing::debug!(
                "🧠 Adaptive interval for '{}': {:.1}m → {:.1}m (score {:.2})",
                schedule_id,
                current,
                next,
                score
            );
        }
        next
    }

    /// Shared 30s poller over all enabled conditional schedules.
    fn spawn_conditional_poller(&self) -> JoinHandle<()> {
        let sched = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(
                Instant::now() + CONDITION_POLL_INTERVAL,
                CONDITION_POLL_INTERVAL,
            );
            loop {
                ticker.tick().await;
                let due = sched.evaluate_conditional_schedules().await;
                for id in due {
                    let run = sched.clone();
                    tokio::spawn(async move { run.fire(&id, TriggerKind::Conditional).await });
                }
            }
        })
    }

    /// Evaluate every enabled conditional schedule, in registration order.
    /// Returns the ids whose combined predicate holds.
    pub(crate) async fn evaluate_conditional_schedules(&self) -> Vec<String> {
        let now = chrono::Local::now();
        let mut due = Vec::new();
        let mut failures: Vec<(String, String)> = Vec::new();

        {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            for entry in &inner.schedules {
                if !entry.config.enabled {
                    continue;
                }
                let ScheduleKind::Conditional { conditions, require_all } = &entry.config.kind
                else {
                    continue;
                };
                let mut results = Vec::with_capacity(conditions.len());
                for cond in conditions {
                    match condition::evaluate(cond, self.metrics.as_ref(), &inner.custom, now) {
                        Ok(value) => results.push(value),
                        Err(e) => {
                            failures.push((cond.id.clone(), e.to_string()));
                            results.push(false);
                        }
                    }
                }
                inner.stats.condition_evaluations += 1;
                if condition::combine(&results, *require_all) {
                    due.push(entry.config.id.clone());
                }
            }
        }

        for (condition_id, error) in failures {
            tracing::warn!("⚠️ Condition '{}' evaluation failed: {}", condition_id, error);
            self.emit(EventKind::ConditionEvaluationFailed { condition_id, error });
        }
        due
    }

    fn spawn_learning_analyzer(&self) -> JoinHandle<()> {
        let sched = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(
                Instant::now() + LEARNING_ANALYSIS_INTERVAL,
                LEARNING_ANALYSIS_INTERVAL,
            );
            loop {
                ticker.tick().await;
                sched.run_learning_analysis().await;
            }
        })
    }

    /// Mine every adaptive schedule's history for patterns and publish fresh
    /// recommendations. Normally driven by the hourly analyzer task.
    pub async fn run_learning_analysis(&self) {
        let updated: Vec<_> = {
            let mut inner = self.inner.lock().await;
            let mut updated = Vec::new();
            for (id, learning) in inner.learning.iter_mut() {
                if learning.analyze() {
                    updated.push((id.clone(), learning.recommendations.clone()));
                }
            }
            updated
        };

        for (schedule_id, recommendations) in updated {
            tracing::debug!(
                "💡 Recommendations updated for '{}': suggested interval {:.1}m",
                schedule_id,
                recommendations.suggested_interval
            );
            self.emit(EventKind::AdaptiveRecommendationsUpdated {
                schedule_id,
                recommendations,
            });
        }
    }

    /// Called by a driver task that stops itself (interval cap reached, cron
    /// expression exhausted).
    async fn retire_driver(&self, schedule_id: &str) {
        let mut inner = self.inner.lock().await;
        inner.drivers.remove(schedule_id);
        inner.active.remove(schedule_id);
        sync_active_count(&mut inner);
        tracing::debug!("⏹️ Driver retired: {}", schedule_id);
    }
}

/// Idempotent: cancels the schedule's driver resource if one exists.
fn stop_driver_locked(inner: &mut Inner, schedule_id: &str) {
    if let Some(handle) = inner.drivers.remove(schedule_id) {
        handle.abort();
    }
}
