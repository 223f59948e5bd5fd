/*
 * Table Extraction Engine - Planner
 *
 * The planner is responsible for:
 * 1. Resolving table mappers against the source catalog
 * 2. Probing key structure and row ranges
 * 3. Partitioning row ranges into balanced split groups
 * 4. Wrapping each group into a self-sufficient extraction task
 */

pub mod catalog;
pub mod mysql;
pub mod partitioner;
pub mod planner;
pub mod probe;
pub mod table;
pub mod task_builder;

pub use catalog::{resolve, MetadataSource};
pub use mysql::MySqlMetadataSource;
pub use partitioner::Partitioner;
pub use planner::ExtractPlanner;
pub use probe::{probe_all, probe_all_sequential, probe_table, DEFAULT_SPLIT_KEY};
pub use table::{ColumnMeta, Table};
pub use task_builder::TaskBuilder;
