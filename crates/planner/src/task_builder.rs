/*
 * Task builder for creating extraction tasks from split groups.
 */

use extract_common::{ExtractTask, JobConfig, SourceConfig, SplitGroup};

/// Builds ExtractTasks from SplitGroups.
pub struct TaskBuilder {
    job_name: String,
    source: SourceConfig,
}

impl TaskBuilder {
    /// Creates a new TaskBuilder carrying the job context every task embeds.
    pub fn from_config(config: &JobConfig) -> Self {
        Self {
            job_name: config.job_name.clone(),
            source: config.source.clone(),
        }
    }

    /// Builds an ExtractTask from a SplitGroup.
    pub fn build_task(&self, group: SplitGroup) -> ExtractTask {
        ExtractTask::new(self.job_name.clone(), group, self.source.clone())
    }

    /// Builds tasks for all non-empty split groups.
    pub fn build_tasks(&self, groups: Vec<SplitGroup>) -> Vec<ExtractTask> {
        groups
            .into_iter()
            .filter(|group| !group.is_empty())
            .map(|group| self.build_task(group))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract_common::Split;

    fn config() -> JobConfig {
        let mut config = JobConfig::default();
        config.job_name = "nightly".into();
        config.source = SourceConfig::new("mysql://localhost/shop");
        config
    }

    #[test]
    fn test_tasks_carry_job_context() {
        let group = SplitGroup::new(vec![Split::new("orders", "ods_orders").with_range(0, 10)]);
        let task = TaskBuilder::from_config(&config()).build_task(group);

        assert_eq!(task.job_name, "nightly");
        assert_eq!(task.source.url, "mysql://localhost/shop");
        assert_eq!(task.total_rows(), 10);
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        let groups = vec![
            SplitGroup::new(vec![Split::new("a", "ods_a").with_range(0, 5)]),
            SplitGroup::default(),
            SplitGroup::new(vec![Split::new("b", "ods_b").with_range(0, 7)]),
        ];
        let tasks = TaskBuilder::from_config(&config()).build_tasks(groups);

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].total_rows(), 5);
        assert_eq!(tasks[1].total_rows(), 7);
    }

    #[test]
    fn test_each_task_gets_a_distinct_id() {
        let groups = vec![
            SplitGroup::new(vec![Split::new("a", "ods_a").with_range(0, 5)]),
            SplitGroup::new(vec![Split::new("b", "ods_b").with_range(0, 5)]),
        ];
        let tasks = TaskBuilder::from_config(&config()).build_tasks(groups);
        assert_ne!(tasks[0].task_id, tasks[1].task_id);
    }
}
