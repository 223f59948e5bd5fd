/*
 * Extraction metrics.
 *
 * Atomic counters shared between the planner and scan executors, with a
 * point-in-time snapshot view for reporting.
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counter registry for one engine instance.
#[derive(Debug, Default)]
pub struct ExtractMetrics {
    // Planner metrics
    pub tables_resolved: AtomicU64,
    pub tables_probed: AtomicU64,
    pub splits_planned: AtomicU64,
    pub groups_planned: AtomicU64,
    pub plans_created: AtomicU64,

    // Scan metrics
    pub tasks_started: AtomicU64,
    pub tasks_completed: AtomicU64,
    pub tasks_failed: AtomicU64,
    pub rows_emitted: AtomicU64,
    pub bytes_written: AtomicU64,

    // Timing metrics (in microseconds)
    pub total_plan_time_us: AtomicU64,
    pub total_scan_time_us: AtomicU64,
}

impl ExtractMetrics {
    /// Creates a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records resolved catalog tables.
    pub fn record_tables_resolved(&self, count: u64) {
        self.tables_resolved.fetch_add(count, Ordering::Relaxed);
    }

    /// Records probed tables.
    pub fn record_tables_probed(&self, count: u64) {
        self.tables_probed.fetch_add(count, Ordering::Relaxed);
    }

    /// Records a finished plan.
    pub fn record_plan(&self, splits: u64, groups: u64) {
        self.plans_created.fetch_add(1, Ordering::Relaxed);
        self.splits_planned.fetch_add(splits, Ordering::Relaxed);
        self.groups_planned.fetch_add(groups, Ordering::Relaxed);
    }

    /// Records a task start.
    pub fn record_task_start(&self) {
        self.tasks_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a task completion.
    pub fn record_task_complete(&self, success: bool) {
        if success {
            self.tasks_completed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.tasks_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records emitted rows.
    pub fn record_rows_emitted(&self, rows: u64) {
        self.rows_emitted.fetch_add(rows, Ordering::Relaxed);
    }

    /// Records bytes written to the record sink.
    pub fn record_bytes_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Records planning time.
    pub fn record_plan_time(&self, duration: Duration) {
        self.total_plan_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Records scan time.
    pub fn record_scan_time(&self, duration: Duration) {
        self.total_scan_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// Returns a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tables_resolved: self.tables_resolved.load(Ordering::Relaxed),
            tables_probed: self.tables_probed.load(Ordering::Relaxed),
            splits_planned: self.splits_planned.load(Ordering::Relaxed),
            groups_planned: self.groups_planned.load(Ordering::Relaxed),
            plans_created: self.plans_created.load(Ordering::Relaxed),
            tasks_started: self.tasks_started.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            rows_emitted: self.rows_emitted.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            total_plan_time_us: self.total_plan_time_us.load(Ordering::Relaxed),
            total_scan_time_us: self.total_scan_time_us.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub tables_resolved: u64,
    pub tables_probed: u64,
    pub splits_planned: u64,
    pub groups_planned: u64,
    pub plans_created: u64,
    pub tasks_started: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub rows_emitted: u64,
    pub bytes_written: u64,
    pub total_plan_time_us: u64,
    pub total_scan_time_us: u64,
}

impl MetricsSnapshot {
    /// Returns the task success rate.
    pub fn success_rate(&self) -> f64 {
        let total = self.tasks_completed + self.tasks_failed;
        if total == 0 {
            1.0
        } else {
            self.tasks_completed as f64 / total as f64
        }
    }

    /// Returns average scan time per completed task.
    pub fn avg_task_time(&self) -> Duration {
        if self.tasks_completed == 0 {
            Duration::ZERO
        } else {
            Duration::from_micros(self.total_scan_time_us / self.tasks_completed)
        }
    }
}

/// Timer guard for measuring operation duration.
pub struct Timer {
    start: Instant,
    metrics: Arc<ExtractMetrics>,
    record_fn: fn(&ExtractMetrics, Duration),
}

impl Timer {
    /// Starts a timer for planning time.
    pub fn planning(metrics: Arc<ExtractMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
            record_fn: |m, d| m.record_plan_time(d),
        }
    }

    /// Starts a timer for scan time.
    pub fn scanning(metrics: Arc<ExtractMetrics>) -> Self {
        Self {
            start: Instant::now(),
            metrics,
            record_fn: |m, d| m.record_scan_time(d),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        (self.record_fn)(&self.metrics, self.start.elapsed());
    }
}
