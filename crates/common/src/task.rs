/*
 * Task envelopes exchanged with the execution host.
 *
 * An ExtractTask is self-sufficient: it embeds the full split chain and the
 * source connection descriptor, so any process that receives one can scan
 * it without further lookups.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ExtractError, SourceConfig, SplitGroup};

/// One schedulable unit of extraction work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractTask {
    pub task_id: Uuid,

    /// Job this task belongs to
    pub job_name: String,

    /// The split chain to scan, in order
    pub group: SplitGroup,

    /// Source database to scan from
    pub source: SourceConfig,
}

impl ExtractTask {
    pub fn new(job_name: impl Into<String>, group: SplitGroup, source: SourceConfig) -> Self {
        Self {
            task_id: Uuid::new_v4(),
            job_name: job_name.into(),
            group,
            source,
        }
    }

    /// Total rows this task will emit.
    pub fn total_rows(&self) -> u64 {
        self.group.total_rows()
    }
}

/// Terminal state of an executed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Completed,
    Failed,
}

/// Counters for one task execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub rows_emitted: u64,
    pub bytes_written: u64,
    pub splits_scanned: usize,
    pub duration_ms: u64,
}

/// Outcome envelope returned by the scan executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractTaskResult {
    pub task_id: Uuid,
    pub status: TaskStatus,

    /// Error description when `status == Failed`
    pub error: Option<String>,

    pub stats: TaskStats,
}

impl ExtractTaskResult {
    pub fn completed(task_id: Uuid, stats: TaskStats) -> Self {
        Self {
            task_id,
            status: TaskStatus::Completed,
            error: None,
            stats,
        }
    }

    pub fn failed(task_id: Uuid, error: &ExtractError, stats: TaskStats) -> Self {
        Self {
            task_id,
            status: TaskStatus::Failed,
            error: Some(format!("{}: {}", error.kind(), error)),
            stats,
        }
    }
}
