/*
 * Scan executor - runs one extraction task end to end.
 *
 * Scans the task's split chain and writes newline-delimited text records
 * to the caller's sink. Failures are reported in the result envelope, not
 * raised; already-written records are left in place for the host to
 * discard or retry.
 */

use std::sync::Arc;
use std::time::Instant;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use extract_common::{
    ExtractError, ExtractMetrics, ExtractTask, ExtractTaskResult, Result, TaskStats, Timer,
};

use crate::scanner::RowScanner;
use crate::source::{MySqlRowSource, RowSource};

/// Executes extraction tasks.
pub struct ScanExecutor {
    metrics: Arc<ExtractMetrics>,
}

impl ScanExecutor {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(ExtractMetrics::new()),
        }
    }

    /// Creates an executor sharing a metrics registry.
    pub fn with_metrics(metrics: Arc<ExtractMetrics>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> Arc<ExtractMetrics> {
        self.metrics.clone()
    }

    /// Executes a task against its embedded MySQL source.
    pub async fn execute<W>(&self, task: ExtractTask, output: &mut W) -> ExtractTaskResult
    where
        W: AsyncWrite + Unpin + Send,
    {
        match MySqlRowSource::connect(&task.source) {
            Ok(source) => self.execute_with_source(task, source, output).await,
            Err(e) => {
                self.metrics.record_task_start();
                self.metrics.record_task_complete(false);
                ExtractTaskResult::failed(task.task_id, &e, TaskStats::default())
            }
        }
    }

    /// Executes a task over an explicit row source.
    #[tracing::instrument(skip_all, fields(task_id = %task.task_id, job = %task.job_name))]
    pub async fn execute_with_source<S, W>(
        &self,
        task: ExtractTask,
        source: S,
        output: &mut W,
    ) -> ExtractTaskResult
    where
        S: RowSource,
        W: AsyncWrite + Unpin + Send,
    {
        let _timer = Timer::scanning(self.metrics.clone());
        self.metrics.record_task_start();
        let started = Instant::now();
        let task_id = task.task_id;
        tracing::info!(
            splits = task.group.len(),
            total_rows = task.total_rows(),
            "starting extraction task"
        );

        let mut scanner = RowScanner::new(source, task.group);
        let mut stats = TaskStats::default();
        let outcome = pump(&mut scanner, output, &mut stats).await;

        if let Err(e) = scanner.close().await {
            tracing::warn!(error = %e, "error closing scanner");
        }
        stats.splits_scanned = scanner.splits_opened();
        stats.duration_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_rows_emitted(stats.rows_emitted);
        self.metrics.record_bytes_written(stats.bytes_written);

        match outcome {
            Ok(()) => {
                self.metrics.record_task_complete(true);
                tracing::info!(
                    rows = stats.rows_emitted,
                    bytes = stats.bytes_written,
                    "extraction task completed"
                );
                ExtractTaskResult::completed(task_id, stats)
            }
            Err(e) => {
                self.metrics.record_task_complete(false);
                tracing::error!(error = %e, rows = stats.rows_emitted, "extraction task failed");
                ExtractTaskResult::failed(task_id, &e, stats)
            }
        }
    }
}

impl Default for ScanExecutor {
    fn default() -> Self {
        Self::new()
    }
}

async fn pump<S, W>(
    scanner: &mut RowScanner<S>,
    output: &mut W,
    stats: &mut TaskStats,
) -> Result<()>
where
    S: RowSource,
    W: AsyncWrite + Unpin + Send,
{
    while scanner.advance().await? {
        let Some(record) = scanner.current_row() else {
            continue;
        };
        output.write_all(record.as_bytes()).await.map_err(write_err)?;
        output.write_all(b"\n").await.map_err(write_err)?;
        stats.bytes_written += record.len() as u64 + 1;
        stats.rows_emitted += 1;
    }
    output.flush().await.map_err(write_err)?;
    Ok(())
}

fn write_err(e: std::io::Error) -> ExtractError {
    ExtractError::Scan(format!("writing record: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::MockRowSource;
    use extract_common::{SourceConfig, Split, SplitGroup, TaskStatus};

    fn row(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn task(group: SplitGroup) -> ExtractTask {
        ExtractTask::new("nightly", group, SourceConfig::new("mysql://localhost/shop"))
    }

    fn split(table: &str, start: i64, end: i64) -> Split {
        Split::new(table, format!("ods_{}", table))
            .with_primary_keys(vec!["id".into()])
            .with_range(start, end)
    }

    #[tokio::test]
    async fn test_execute_writes_newline_delimited_records() {
        let source = MockRowSource::default()
            .with_rows("t1", 0, vec![row(&["1", "a"]), row(&["2", "b"])])
            .with_rows("t2", 0, vec![row(&["9", "z"])]);
        let group = SplitGroup::new(vec![split("t1", 0, 2), split("t2", 0, 1)]);

        let executor = ScanExecutor::new();
        let mut out: Vec<u8> = Vec::new();
        let result = executor
            .execute_with_source(task(group), source, &mut out)
            .await;

        assert_eq!(result.status, TaskStatus::Completed);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1\u{0001}a\n2\u{0001}b\n9\u{0001}z\n"
        );
        assert_eq!(result.stats.rows_emitted, 3);
        assert_eq!(result.stats.splits_scanned, 2);
        assert_eq!(result.stats.bytes_written, 12);

        let snapshot = executor.metrics().snapshot();
        assert_eq!(snapshot.tasks_completed, 1);
        assert_eq!(snapshot.rows_emitted, 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_partial_output_and_stats() {
        let source = MockRowSource::default()
            .with_rows("t1", 0, vec![row(&["a"]), row(&["b"]), row(&["c"])])
            .fail_after("t1", 2);
        let closed = source.closed_flag();
        let group = SplitGroup::new(vec![split("t1", 0, 3)]);

        let executor = ScanExecutor::new();
        let mut out: Vec<u8> = Vec::new();
        let result = executor
            .execute_with_source(task(group), source, &mut out)
            .await;

        assert_eq!(result.status, TaskStatus::Failed);
        assert!(result.error.as_deref().unwrap().starts_with("scan:"));
        // No rollback of already-emitted records
        assert_eq!(String::from_utf8(out).unwrap(), "a\nb\n");
        assert_eq!(result.stats.rows_emitted, 2);
        assert!(closed.load(std::sync::atomic::Ordering::SeqCst));

        let snapshot = executor.metrics().snapshot();
        assert_eq!(snapshot.tasks_failed, 1);
        assert_eq!(snapshot.rows_emitted, 2);
    }

    #[tokio::test]
    async fn test_empty_task_completes_with_no_output() {
        let executor = ScanExecutor::new();
        let mut out: Vec<u8> = Vec::new();
        let result = executor
            .execute_with_source(task(SplitGroup::default()), MockRowSource::default(), &mut out)
            .await;

        assert_eq!(result.status, TaskStatus::Completed);
        assert!(out.is_empty());
        assert_eq!(result.stats.rows_emitted, 0);
    }
}
