/*
 * Table catalog resolution.
 *
 * Turns configured table mappers into concrete Table descriptors against
 * live database metadata. The MetadataSource trait is the planner's only
 * door to the source database, so tests can run against a canned catalog.
 */

use async_trait::async_trait;

use extract_common::{ExtractError, Result, TableMapper};

use crate::table::{ColumnMeta, Table};

/// Access to the source database's schema catalog and aggregate queries.
///
/// Implementations hold their own connection. Split keys are required to be
/// integer-valued columns; `key_range` reports a non-integer key as a
/// metadata error.
#[async_trait]
pub trait MetadataSource: Send {
    /// Table names matching a SQL LIKE pattern in the connected schema.
    async fn list_tables(&mut self, pattern: &str) -> Result<Vec<String>>;

    /// Primary-key columns of a table.
    async fn primary_key_columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>>;

    /// All columns of a table with ordinal positions. An unknown table
    /// yields an empty list, mirroring the information_schema behavior.
    async fn columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>>;

    /// MIN and MAX of the split key, or None when the table is empty.
    async fn key_range(&mut self, table: &str, key: &str) -> Result<Option<(i64, i64)>>;

    /// Row count of a table.
    async fn row_count(&mut self, table: &str) -> Result<i64>;
}

/// Resolves every mapper into zero or more Tables.
///
/// The source reference is normalized first (a non-empty `sourceTable` wins
/// over the nested `source.tableName`), then a wildcard reference expands
/// into one Table per match, every match sharing the mapper's target, split
/// key, and field allowlist. Matches are sorted by name so identical
/// databases always resolve to the same table order, which keeps downstream
/// partitioning deterministic. A literal reference resolves without an
/// existence check; a missing table surfaces as a metadata error during
/// probing.
pub async fn resolve<S: MetadataSource + ?Sized>(
    source: &mut S,
    mappers: &[TableMapper],
) -> Result<Vec<Table>> {
    let mut tables = Vec::new();

    for mapper in mappers {
        // The field allowlist travels only with the nested form.
        let (reference, fields) = match (&mapper.source_table, &mapper.source) {
            (Some(name), _) if !name.is_empty() => (name.as_str(), &[][..]),
            (_, Some(nested)) if !nested.table_name.is_empty() => {
                (nested.table_name.as_str(), nested.fields.as_slice())
            }
            _ => {
                return Err(ExtractError::Config(format!(
                    "mapper for target `{}` names no source table",
                    mapper.target_table
                )));
            }
        };

        if mapper.is_wildcard() {
            let mut matches = source.list_tables(reference).await?;
            matches.sort();
            tracing::debug!(pattern = %reference, matches = matches.len(), "expanded wildcard mapper");
            for name in matches {
                tables.push(mapper_table(name, mapper, fields));
            }
        } else {
            tables.push(mapper_table(reference.to_string(), mapper, fields));
        }
    }

    Ok(tables)
}

/// One resolved Table carrying the mapper's target, split key, and allowlist.
fn mapper_table(name: String, mapper: &TableMapper, fields: &[String]) -> Table {
    let mut table = Table::new(name, &mapper.target_table);
    if let Some(key) = &mapper.split_key {
        table = table.with_split_key(key);
    }
    if !fields.is_empty() {
        table = table.with_requested_fields(fields.to_vec());
    }
    table
}


#[cfg(test)]
mod tests {
    use super::mock::{MockMetadataSource, MockTableDef};
    use super::*;
    use extract_common::TableMapperBuilder;

    fn def_with_rows(rows: i64) -> MockTableDef {
        MockTableDef {
            columns: vec![ColumnMeta::new("id", "bigint", 1)],
            key_names: vec!["id".into()],
            key_range: None,
            row_count: rows,
        }
    }

    #[tokio::test]
    async fn test_literal_mapper_resolves_one_table() {
        let mut source = MockMetadataSource::new();
        let mappers = vec![TableMapperBuilder::default()
            .source_table(Some("orders".to_string()))
            .split_key(Some("order_id".to_string()))
            .target_table("ods_orders")
            .build()
            .unwrap()];

        let tables = resolve(&mut source, &mappers).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "orders");
        assert_eq!(tables[0].target, "ods_orders");
        assert_eq!(tables[0].split_key.as_deref(), Some("order_id"));
    }

    #[tokio::test]
    async fn test_wildcard_mapper_expands_sorted_with_shared_target() {
        let mut source = MockMetadataSource::new()
            .with_table("orders_2024", def_with_rows(10))
            .with_table("orders_2023", def_with_rows(10))
            .with_table("users", def_with_rows(10));
        let mappers = vec![TableMapperBuilder::default()
            .source_table(Some("orders_%".to_string()))
            .target_table("ods_orders_all")
            .build()
            .unwrap()];

        let tables = resolve(&mut source, &mappers).await.unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders_2023", "orders_2024"]);
        assert!(tables.iter().all(|t| t.target == "ods_orders_all"));
    }

    #[tokio::test]
    async fn test_wildcard_with_no_matches_is_empty() {
        let mut source = MockMetadataSource::new().with_table("users", def_with_rows(1));
        let mappers = vec![TableMapperBuilder::default()
            .source_table(Some("orders_%".to_string()))
            .target_table("ods_orders_all")
            .build()
            .unwrap()];

        let tables = resolve(&mut source, &mappers).await.unwrap();
        assert!(tables.is_empty());
    }

    #[tokio::test]
    async fn test_nested_source_carries_field_allowlist() {
        let mut source = MockMetadataSource::new();
        let mappers = vec![TableMapperBuilder::default()
            .source(Some(extract_common::MapperSource {
                table_name: "users".into(),
                fields: vec!["name".into(), "email".into()],
            }))
            .target_table("ods_users")
            .build()
            .unwrap()];

        let tables = resolve(&mut source, &mappers).await.unwrap();
        assert_eq!(tables[0].name, "users");
        assert_eq!(
            tables[0].requested_fields.as_deref(),
            Some(["name".to_string(), "email".to_string()].as_slice())
        );
    }

    #[tokio::test]
    async fn test_nested_wildcard_expands_with_shared_allowlist() {
        let mut source = MockMetadataSource::new()
            .with_table("orders_2023", def_with_rows(10))
            .with_table("orders_2024", def_with_rows(10))
            .with_table("users", def_with_rows(10));
        let mappers = vec![TableMapperBuilder::default()
            .source(Some(extract_common::MapperSource {
                table_name: "orders_%".into(),
                fields: vec!["amount".into()],
            }))
            .target_table("ods_orders_all")
            .build()
            .unwrap()];

        let tables = resolve(&mut source, &mappers).await.unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders_2023", "orders_2024"]);
        assert!(tables
            .iter()
            .all(|t| t.requested_fields.as_deref() == Some(["amount".to_string()].as_slice())));
        assert!(tables.iter().all(|t| t.target == "ods_orders_all"));
    }

    #[tokio::test]
    async fn test_unnamed_mapper_is_config_error() {
        let mut source = MockMetadataSource::new();
        let mappers = vec![TableMapperBuilder::default()
            .target_table("ods_orphan")
            .build()
            .unwrap()];

        let err = resolve(&mut source, &mappers).await.unwrap_err();
        assert_eq!(err.kind(), "config");
    }
}
