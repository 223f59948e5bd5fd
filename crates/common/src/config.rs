/*
 * Job configuration for table extraction.
 *
 * Parses the camelCase JSON job documents the surrounding scheduler hands
 * over. Keys that belong to the excluded output surface (Hive DDL, schema
 * checks) are ignored on parse.
 */

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{ExtractError, Result, SourceConfig};

/// One extraction job: a source database plus an ordered list of table
/// mappings and a desired partition count.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfig {
    /// Job name, carried into task envelopes and logs
    pub job_name: String,

    /// Source database connection
    pub source: SourceConfig,

    /// Desired partition count (the target number of units of work)
    pub task_num: usize,

    /// Ordered table mappings
    pub mappers: Vec<TableMapper>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            job_name: String::new(),
            source: SourceConfig::default(),
            task_num: 1,
            mappers: Vec::new(),
        }
    }
}

impl JobConfig {
    /// Parses a JSON job document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: JobConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Checks the parts of the document that cannot be caught by serde.
    ///
    /// A `taskNum` of zero is not rejected here: the partitioner treats it
    /// as "produce no units of work".
    pub fn validate(&self) -> Result<()> {
        if self.job_name.is_empty() {
            return Err(ExtractError::Config("jobName must not be empty".into()));
        }
        if self.source.url.is_empty() {
            return Err(ExtractError::Config("source.url must not be empty".into()));
        }
        for (i, mapper) in self.mappers.iter().enumerate() {
            mapper
                .validate()
                .map_err(|e| e.with_context(format!("mapper[{}]", i)))?;
        }
        Ok(())
    }
}

/// One table mapping: either a `sourceTable` reference or an explicit
/// `source.{tableName, fields[]}` with an output column allowlist. Either
/// form may be a literal name or a `%` wildcard pattern.
#[derive(Debug, Clone, Serialize, Deserialize, Builder, Default)]
#[builder(setter(into), default)]
#[serde(rename_all = "camelCase")]
pub struct TableMapper {
    /// Literal table name, or a wildcard pattern containing `%`
    #[serde(default)]
    pub source_table: Option<String>,

    /// Explicit split-key override
    #[serde(default)]
    pub split_key: Option<String>,

    /// Alternative source form with a field allowlist
    #[serde(default)]
    pub source: Option<MapperSource>,

    /// Target table name
    pub target_table: String,
}

impl TableMapper {
    /// The effective source reference: a non-empty `sourceTable` wins,
    /// otherwise the nested source's table name.
    pub fn source_reference(&self) -> Option<&str> {
        match self.source_table.as_deref() {
            Some(name) if !name.is_empty() => Some(name),
            _ => self
                .source
                .as_ref()
                .map(|s| s.table_name.as_str())
                .filter(|name| !name.is_empty()),
        }
    }

    /// True when the source reference is a wildcard pattern.
    pub fn is_wildcard(&self) -> bool {
        self.source_reference()
            .is_some_and(|name| name.contains('%'))
    }

    fn validate(&self) -> Result<()> {
        if self.target_table.is_empty() {
            return Err(ExtractError::Config("targetTable must not be empty".into()));
        }
        if self.source_reference().is_none() {
            return Err(ExtractError::Config(
                "either sourceTable or source.tableName is required".into(),
            ));
        }
        Ok(())
    }
}

/// The nested `source` form of a mapper.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MapperSource {
    pub table_name: String,

    /// Output column allowlist; order is preserved in the emitted records
    #[serde(default)]
    pub fields: Vec<String>,
}
