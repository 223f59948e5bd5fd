/*
 * Table Extraction Engine - Common Types
 *
 * Shared types, errors, and configuration used across planner and scanner.
 */

pub mod config;
pub mod error;
pub mod metrics;
pub mod source;
pub mod split;
pub mod task;

pub use config::{JobConfig, JobConfigBuilder, MapperSource, TableMapper, TableMapperBuilder};
pub use error::{ExtractError, Result, ResultExt};
pub use metrics::{ExtractMetrics, MetricsSnapshot, Timer};
pub use source::SourceConfig;
pub use split::{Split, SplitGroup};
pub use task::{ExtractTask, ExtractTaskResult, TaskStats, TaskStatus};
