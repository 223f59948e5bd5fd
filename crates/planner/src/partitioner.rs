/*
 * Balanced split partitioning.
 *
 * Greedy bin-packing of table lengths into near-equal groups of scan work.
 * Oversized tables are sliced into step-sized chunks; undersized tables and
 * trailing chunk remainders are chained together until they fill a step.
 * Pure in-memory computation, no I/O.
 */

use std::cmp::Ordering;

use extract_common::{Split, SplitGroup};

use crate::table::Table;

/// Packs probed tables into approximately `partition_count` split groups.
#[derive(Debug, Clone)]
pub struct Partitioner {
    partition_count: usize,
}

impl Partitioner {
    pub fn new(partition_count: usize) -> Self {
        Self { partition_count }
    }

    /// Partitions tables into groups of roughly `total / partition_count`
    /// rows each.
    ///
    /// Zero desired partitions or zero total rows produce no groups. Tables
    /// are walked largest first; equal lengths keep catalog order, so the
    /// same input always yields the same groups.
    pub fn partition(&self, tables: &[Table]) -> Vec<SplitGroup> {
        let total: u64 = tables.iter().map(Table::len).sum();
        if self.partition_count == 0 || total == 0 {
            return Vec::new();
        }
        // Clamp so subdivision stays defined when rows < partitions
        let step = (total / self.partition_count as u64).max(1);

        let mut sorted: Vec<&Table> = tables.iter().filter(|t| !t.is_empty()).collect();
        sorted.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut groups: Vec<SplitGroup> = Vec::new();
        let mut carry: Vec<Split> = Vec::new();
        let mut carry_rows: u64 = 0;
        let mut small: Vec<&Table> = Vec::new();

        for table in sorted {
            match table.len().cmp(&step) {
                Ordering::Equal => {
                    groups.push(SplitGroup::new(vec![
                        table.split_for_range(table.start, table.end)
                    ]));
                }
                Ordering::Greater => {
                    let chunks = table.len().div_ceil(step);
                    for i in 0..chunks {
                        // A key range may end at i64::MAX; saturate before
                        // clamping to the table end
                        let start = table.start.saturating_add((i * step) as i64);
                        let end = start.saturating_add(step as i64).min(table.end);
                        let split = table.split_for_range(start, end);
                        if split.len() == step {
                            groups.push(SplitGroup::new(vec![split]));
                        } else {
                            // Trailing partial chunk: hold it until enough
                            // remainders accumulate to fill a step
                            carry_rows += split.len();
                            carry.push(split);
                            if carry_rows >= step {
                                groups.push(SplitGroup::new(std::mem::take(&mut carry)));
                                carry_rows = 0;
                            }
                        }
                    }
                }
                Ordering::Less => small.push(table),
            }
        }

        // Small tables chain behind whatever remainder is still carried.
        let mut current = std::mem::take(&mut carry);
        let mut current_rows = carry_rows;
        for table in small {
            current.push(table.split_for_range(table.start, table.end));
            current_rows += table.len();
            if current_rows >= step {
                groups.push(SplitGroup::new(std::mem::take(&mut current)));
                current_rows = 0;
            }
        }

        if !current.is_empty() {
            let enough_groups = groups.len() >= self.partition_count;
            match groups.last_mut() {
                Some(last) if enough_groups => last.splits.extend(current),
                _ => groups.push(SplitGroup::new(current)),
            }
        }

        tracing::debug!(
            total_rows = total,
            step,
            groups = groups.len(),
            "partitioned tables"
        );
        groups
    }
}
