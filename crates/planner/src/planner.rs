/*
 * Extraction planning pipeline.
 *
 * Resolves mappers against the source catalog, probes table metadata,
 * partitions row ranges into balanced split groups, and wraps each group
 * in a task envelope ready for the execution host.
 */

use std::sync::Arc;

use extract_common::{ExtractMetrics, ExtractTask, JobConfig, Result, SplitGroup, Timer};

use crate::catalog::{self, MetadataSource};
use crate::mysql::MySqlMetadataSource;
use crate::partitioner::Partitioner;
use crate::probe;
use crate::table::Table;
use crate::task_builder::TaskBuilder;

/// Plans an extraction job end to end.
pub struct ExtractPlanner {
    config: JobConfig,
    metrics: Arc<ExtractMetrics>,
}

impl ExtractPlanner {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(ExtractMetrics::new()),
        }
    }

    /// Shares a metrics registry with the rest of the process.
    pub fn with_metrics(mut self, metrics: Arc<ExtractMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<ExtractMetrics> {
        self.metrics.clone()
    }

    /// Computes balanced split groups for the configured job.
    ///
    /// Opens a short-lived metadata connection for name resolution; probing
    /// manages its own connections and fans out for larger table sets.
    #[tracing::instrument(skip(self), fields(job = %self.config.job_name))]
    pub async fn plan_groups(&self) -> Result<Vec<SplitGroup>> {
        let _timer = Timer::planning(self.metrics.clone());
        self.config.validate()?;

        let mut source = MySqlMetadataSource::connect(&self.config.source).await?;
        let tables = catalog::resolve(&mut source, &self.config.mappers).await?;
        drop(source);
        self.metrics.record_tables_resolved(tables.len() as u64);

        let tables = probe::probe_all(&self.config.source, tables).await?;
        self.metrics.record_tables_probed(tables.len() as u64);

        Ok(self.partition_probed(&tables))
    }

    /// Like [`plan_groups`](Self::plan_groups) but over an already-open
    /// metadata source, probing sequentially.
    pub async fn plan_groups_on<S: MetadataSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<Vec<SplitGroup>> {
        let _timer = Timer::planning(self.metrics.clone());
        self.config.validate()?;

        let mut tables = catalog::resolve(source, &self.config.mappers).await?;
        self.metrics.record_tables_resolved(tables.len() as u64);

        probe::probe_all_sequential(source, &mut tables).await?;
        self.metrics.record_tables_probed(tables.len() as u64);

        Ok(self.partition_probed(&tables))
    }

    /// Plans the job and wraps every group in a task envelope.
    pub async fn plan(&self) -> Result<Vec<ExtractTask>> {
        let groups = self.plan_groups().await?;
        Ok(TaskBuilder::from_config(&self.config).build_tasks(groups))
    }

    fn partition_probed(&self, tables: &[Table]) -> Vec<SplitGroup> {
        let total_rows: u64 = tables.iter().map(Table::len).sum();
        let groups = Partitioner::new(self.config.task_num).partition(tables);
        let splits: u64 = groups.iter().map(|g| g.len() as u64).sum();
        self.metrics.record_plan(splits, groups.len() as u64);

        tracing::info!(
            tables = tables.len(),
            total_rows,
            groups = groups.len(),
            splits,
            "planned extraction job"
        );
        groups
    }
}
