/*
 * Split and split-group descriptors.
 *
 * A Split is one bounded scan range over one table; a SplitGroup is the
 * ordered chain of splits that makes up one unit of work. The whole group
 * serializes as a single value, so handing a unit to another process never
 * requires a side lookup to reconstruct its chain.
 */

use serde::{Deserialize, Serialize};

/// One bounded scan unit over one table.
///
/// `start`/`end` form a half-open range: values of the split key when
/// `split_key` is set, a row offset window otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// Source table name
    pub table: String,

    /// Target table the rows load into
    pub target_table: String,

    /// Primary-key column names, ordinal order
    pub primary_keys: Vec<String>,

    /// Projected field columns, in output order
    pub fields: Vec<String>,

    /// Split-key column, when range slicing applies
    pub split_key: Option<String>,

    pub start: i64,
    pub end: i64,
}

impl Split {
    pub fn new(table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            target_table: target_table.into(),
            primary_keys: Vec::new(),
            fields: Vec::new(),
            split_key: None,
            start: 0,
            end: 0,
        }
    }

    /// Sets the primary-key column names.
    pub fn with_primary_keys(mut self, primary_keys: Vec<String>) -> Self {
        self.primary_keys = primary_keys;
        self
    }

    /// Sets the projected field columns.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the split key.
    pub fn with_split_key(mut self, split_key: impl Into<String>) -> Self {
        self.split_key = Some(split_key.into());
        self
    }

    /// Sets the half-open scan range.
    pub fn with_range(mut self, start: i64, end: i64) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Number of rows this split covers.
    pub fn len(&self) -> u64 {
        (self.end - self.start).max(0) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when this split slices by key range rather than offset window.
    pub fn is_keyed(&self) -> bool {
        self.split_key.is_some()
    }
}

/// One unit of work: splits scanned strictly in order as one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitGroup {
    pub splits: Vec<Split>,
}

impl SplitGroup {
    pub fn new(splits: Vec<Split>) -> Self {
        Self { splits }
    }

    pub fn push(&mut self, split: Split) {
        self.splits.push(split);
    }

    /// Number of splits in the chain.
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Total rows across the chain.
    pub fn total_rows(&self) -> u64 {
        self.splits.iter().map(Split::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_len_clamps_negative() {
        let split = Split::new("t", "ods_t").with_range(10, 10);
        assert_eq!(split.len(), 0);
        assert!(split.is_empty());

        let inverted = Split::new("t", "ods_t").with_range(10, 5);
        assert_eq!(inverted.len(), 0);
    }

    #[test]
    fn test_group_total_rows() {
        let group = SplitGroup::new(vec![
            Split::new("a", "ods_a").with_range(0, 90),
            Split::new("b", "ods_b").with_range(0, 50),
            Split::new("c", "ods_c").with_range(5, 35),
        ]);
        assert_eq!(group.len(), 3);
        assert_eq!(group.total_rows(), 170);
    }

    #[test]
    fn test_group_serde_round_trip_keeps_chain() {
        let group = SplitGroup::new(vec![
            Split::new("orders", "ods_orders")
                .with_primary_keys(vec!["id".into()])
                .with_fields(vec!["amount".into(), "status".into()])
                .with_split_key("id")
                .with_range(90, 100),
            Split::new("users", "ods_users")
                .with_primary_keys(vec!["uid".into(), "region".into()])
                .with_fields(vec!["name".into()])
                .with_range(0, 50),
        ]);

        let json = serde_json::to_string(&group).unwrap();
        let back: SplitGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(back, group);
        assert_eq!(back.splits[1].primary_keys, vec!["uid", "region"]);
    }
}
