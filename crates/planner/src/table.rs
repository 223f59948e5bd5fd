/*
 * Resolved table descriptors.
 *
 * A Table is one catalog-resolved source table enriched by the metadata
 * probe: its key/ordinary columns in ordinal order and its numeric scan
 * range. The partitioner slices Tables into Splits.
 */

use extract_common::{ExtractError, Result, Split};

/// One column as reported by the source's schema catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,

    /// Source type name, e.g. `bigint` or `varchar`
    pub type_name: String,

    /// 1-based ordinal position within the table
    pub ordinal: u32,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ordinal,
        }
    }
}

/// A resolved source table with probed metadata.
#[derive(Debug, Clone)]
pub struct Table {
    /// Source table name
    pub name: String,

    /// Target table the rows load into
    pub target: String,

    /// Split key, once the probe's key policy has run
    pub split_key: Option<String>,

    /// Field allowlist from the mapper, when one was configured
    pub requested_fields: Option<Vec<String>>,

    /// Primary-key columns, ordinal ascending
    pub key_columns: Vec<ColumnMeta>,

    /// Non-key columns, ordinal ascending
    pub ordinary_columns: Vec<ColumnMeta>,

    /// Half-open extraction range
    pub start: i64,
    pub end: i64,
}

impl Table {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            split_key: None,
            requested_fields: None,
            key_columns: Vec::new(),
            ordinary_columns: Vec::new(),
            start: 0,
            end: 0,
        }
    }

    /// Sets the mapper's explicit split key.
    pub fn with_split_key(mut self, split_key: impl Into<String>) -> Self {
        self.split_key = Some(split_key.into());
        self
    }

    /// Sets the mapper's field allowlist.
    pub fn with_requested_fields(mut self, fields: Vec<String>) -> Self {
        self.requested_fields = Some(fields);
        self
    }

    /// Stores probed columns, each bucket sorted by ordinal.
    pub fn set_columns(&mut self, mut keys: Vec<ColumnMeta>, mut ordinary: Vec<ColumnMeta>) {
        keys.sort_by_key(|c| c.ordinal);
        ordinary.sort_by_key(|c| c.ordinal);
        self.key_columns = keys;
        self.ordinary_columns = ordinary;
    }

    /// Stores the probed half-open range.
    pub fn set_range(&mut self, start: i64, end: i64) {
        self.start = start;
        self.end = end;
    }

    /// Number of rows the range covers.
    pub fn len(&self) -> u64 {
        (self.end - self.start).max(0) as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Primary-key column names in ordinal order.
    pub fn key_names(&self) -> Vec<String> {
        self.key_columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Output field names: the allowlist when configured, otherwise all
    /// non-key columns in ordinal order.
    pub fn field_names(&self) -> Vec<String> {
        match &self.requested_fields {
            Some(fields) => fields.clone(),
            None => self.ordinary_columns.iter().map(|c| c.name.clone()).collect(),
        }
    }

    /// Checks that every allowlisted field exists on the table.
    pub fn validate_requested_fields(&self) -> Result<()> {
        let Some(fields) = &self.requested_fields else {
            return Ok(());
        };
        for field in fields {
            let known = self
                .key_columns
                .iter()
                .chain(self.ordinary_columns.iter())
                .any(|c| c.name == *field);
            if !known {
                return Err(ExtractError::Metadata(format!(
                    "table `{}` has no column `{}` named in the field list",
                    self.name, field
                )));
            }
        }
        Ok(())
    }

    /// Builds the Split covering `[start, end)` of this table.
    pub fn split_for_range(&self, start: i64, end: i64) -> Split {
        let mut split = Split::new(&self.name, &self.target)
            .with_primary_keys(self.key_names())
            .with_fields(self.field_names())
            .with_range(start, end);
        if let Some(key) = &self.split_key {
            split = split.with_split_key(key);
        }
        split
    }
}
