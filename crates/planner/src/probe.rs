/*
 * Metadata probing.
 *
 * Fills each resolved Table with its column buckets and extraction range.
 * Above a small table count the probes fan out to a bounded pool where
 * every in-flight probe owns its own short-lived connection; any failure
 * aborts the whole phase.
 */

use futures::stream::{self, StreamExt, TryStreamExt};

use extract_common::{ExtractError, Result, SourceConfig};

use crate::catalog::MetadataSource;
use crate::mysql::MySqlMetadataSource;
use crate::table::Table;

/// Key name adopted automatically when it is the sole primary key.
pub const DEFAULT_SPLIT_KEY: &str = "id";

/// Table count above which probing fans out to the worker pool.
const PARALLEL_PROBE_THRESHOLD: usize = 3;

/// Concurrent probes (and therefore connections) in the fan-out path.
const PROBE_POOL_SIZE: usize = 4;

/// Probes one table: columns, split-key policy, extraction range.
#[tracing::instrument(skip(source, table), fields(table = %table.name))]
pub async fn probe_table<S: MetadataSource + ?Sized>(
    source: &mut S,
    table: &mut Table,
) -> Result<()> {
    let keys = source.primary_key_columns(&table.name).await?;
    let all_columns = source.columns(&table.name).await?;
    if all_columns.is_empty() {
        return Err(ExtractError::Metadata(format!(
            "table `{}` does not exist in the source schema",
            table.name
        )));
    }
    if keys.is_empty() {
        return Err(ExtractError::Metadata(format!(
            "table `{}` has no primary key; cannot form composite keys or a stable scan order",
            table.name
        )));
    }

    let key_names: Vec<&str> = keys.iter().map(|c| c.name.as_str()).collect();
    let ordinary = all_columns
        .iter()
        .filter(|c| !key_names.contains(&c.name.as_str()))
        .cloned()
        .collect();
    table.set_columns(keys, ordinary);
    table.validate_requested_fields()?;

    // Split-key policy: an explicit mapper key wins, an empty one counts
    // as absent; otherwise a sole primary key named "id" (any case) is
    // adopted; otherwise fall back to row counting.
    if table.split_key.as_deref() == Some("") {
        table.split_key = None;
    }
    if table.split_key.is_none()
        && table.key_columns.len() == 1
        && table.key_columns[0].name.eq_ignore_ascii_case(DEFAULT_SPLIT_KEY)
    {
        table.split_key = Some(table.key_columns[0].name.clone());
    }

    match table.split_key.clone() {
        Some(key) => match source.key_range(&table.name, &key).await? {
            Some((min, max)) => {
                let end = max.checked_add(1).ok_or_else(|| {
                    ExtractError::Metadata(format!(
                        "split key `{}` of `{}` reaches the integer maximum",
                        key, table.name
                    ))
                })?;
                table.set_range(min, end);
            }
            // Empty table: no keys, nothing to scan
            None => table.set_range(0, 0),
        },
        None => {
            let count = source.row_count(&table.name).await?;
            table.set_range(0, count);
        }
    }

    tracing::debug!(
        table = %table.name,
        split_key = table.split_key.as_deref().unwrap_or("<none>"),
        start = table.start,
        end = table.end,
        "probed table"
    );
    Ok(())
}

/// Probes every table sequentially over one metadata source.
pub async fn probe_all_sequential<S: MetadataSource + ?Sized>(
    source: &mut S,
    tables: &mut [Table],
) -> Result<()> {
    for table in tables.iter_mut() {
        probe_table(source, table).await?;
    }
    Ok(())
}

/// Probes all tables, fanning out above the threshold.
///
/// The fan-out keeps at most `PROBE_POOL_SIZE` probes in flight, each on
/// its own connection, and yields results in input order so planning stays
/// deterministic. The first failure cancels the remaining probes.
pub async fn probe_all(source_config: &SourceConfig, mut tables: Vec<Table>) -> Result<Vec<Table>> {
    if tables.len() <= PARALLEL_PROBE_THRESHOLD {
        let mut source = MySqlMetadataSource::connect(source_config).await?;
        probe_all_sequential(&mut source, &mut tables).await?;
        return Ok(tables);
    }

    tracing::info!(
        tables = tables.len(),
        pool = PROBE_POOL_SIZE,
        "probing tables concurrently"
    );
    stream::iter(tables.into_iter().map(|mut table| {
        let config = source_config.clone();
        async move {
            let mut source = MySqlMetadataSource::connect(&config).await?;
            probe_table(&mut source, &mut table).await?;
            Ok(table)
        }
    }))
    .buffered(PROBE_POOL_SIZE)
    .try_collect()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::{MockMetadataSource, MockTableDef};
    use crate::table::ColumnMeta;

    fn keyed_table(rows: i64) -> MockTableDef {
        MockTableDef {
            columns: vec![
                ColumnMeta::new("id", "bigint", 1),
                ColumnMeta::new("amount", "decimal", 2),
                ColumnMeta::new("status", "varchar", 3),
            ],
            key_names: vec!["id".into()],
            key_range: (rows > 0).then_some((1, rows)),
            row_count: rows,
        }
    }

    #[tokio::test]
    async fn test_sole_id_key_is_adopted_case_insensitively() {
        let def = MockTableDef {
            columns: vec![
                ColumnMeta::new("ID", "bigint", 1),
                ColumnMeta::new("name", "varchar", 2),
            ],
            key_names: vec!["ID".into()],
            key_range: Some((10, 49)),
            row_count: 40,
        };
        let mut source = MockMetadataSource::new().with_table("users", def);
        let mut table = Table::new("users", "ods_users");

        probe_table(&mut source, &mut table).await.unwrap();
        assert_eq!(table.split_key.as_deref(), Some("ID"));
        assert_eq!((table.start, table.end), (10, 50));
        assert_eq!(table.len(), 40);
    }

    #[tokio::test]
    async fn test_non_id_sole_key_falls_back_to_counting() {
        let def = MockTableDef {
            columns: vec![
                ColumnMeta::new("uid", "bigint", 1),
                ColumnMeta::new("name", "varchar", 2),
            ],
            key_names: vec!["uid".into()],
            key_range: Some((1, 1000)),
            row_count: 25,
        };
        let mut source = MockMetadataSource::new().with_table("users", def);
        let mut table = Table::new("users", "ods_users");

        probe_table(&mut source, &mut table).await.unwrap();
        assert_eq!(table.split_key, None);
        assert_eq!((table.start, table.end), (0, 25));
    }

    #[tokio::test]
    async fn test_composite_key_falls_back_to_counting() {
        let def = MockTableDef {
            columns: vec![
                ColumnMeta::new("id", "bigint", 1),
                ColumnMeta::new("region", "varchar", 2),
                ColumnMeta::new("name", "varchar", 3),
            ],
            key_names: vec!["id".into(), "region".into()],
            key_range: None,
            row_count: 7,
        };
        let mut source = MockMetadataSource::new().with_table("events", def);
        let mut table = Table::new("events", "ods_events");

        probe_table(&mut source, &mut table).await.unwrap();
        assert_eq!(table.split_key, None);
        assert_eq!(table.len(), 7);
        assert_eq!(table.key_names(), vec!["id", "region"]);
    }

    #[tokio::test]
    async fn test_explicit_split_key_wins() {
        let mut def = keyed_table(100);
        def.key_range = Some((5, 104));
        let mut source = MockMetadataSource::new().with_table("orders", def);
        let mut table = Table::new("orders", "ods_orders").with_split_key("id");

        probe_table(&mut source, &mut table).await.unwrap();
        assert_eq!(table.split_key.as_deref(), Some("id"));
        assert_eq!((table.start, table.end), (5, 105));
    }

    #[tokio::test]
    async fn test_empty_split_key_counts_as_absent() {
        let uid_def = MockTableDef {
            columns: vec![
                ColumnMeta::new("uid", "bigint", 1),
                ColumnMeta::new("name", "varchar", 2),
            ],
            key_names: vec!["uid".into()],
            key_range: Some((1, 1000)),
            row_count: 25,
        };
        let mut source = MockMetadataSource::new()
            .with_table("events", uid_def)
            .with_table("orders", keyed_table(40));

        // The empty override must never reach the range query
        let mut events = Table::new("events", "ods_events").with_split_key("");
        probe_table(&mut source, &mut events).await.unwrap();
        assert_eq!(events.split_key, None);
        assert_eq!((events.start, events.end), (0, 25));

        // Sole-"id" adoption still applies once the override is dropped
        let mut orders = Table::new("orders", "ods_orders").with_split_key("");
        probe_table(&mut source, &mut orders).await.unwrap();
        assert_eq!(orders.split_key.as_deref(), Some("id"));
        assert_eq!((orders.start, orders.end), (1, 41));
    }

    #[tokio::test]
    async fn test_empty_keyed_table_probes_to_zero_range() {
        let mut source = MockMetadataSource::new().with_table("orders", keyed_table(0));
        let mut table = Table::new("orders", "ods_orders");

        probe_table(&mut source, &mut table).await.unwrap();
        assert_eq!((table.start, table.end), (0, 0));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_missing_table_is_metadata_error() {
        let mut source = MockMetadataSource::new();
        let mut table = Table::new("ghost", "ods_ghost");

        let err = probe_table(&mut source, &mut table).await.unwrap_err();
        assert_eq!(err.kind(), "metadata");
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn test_keyless_table_is_metadata_error() {
        let def = MockTableDef {
            columns: vec![ColumnMeta::new("payload", "text", 1)],
            key_names: vec![],
            key_range: None,
            row_count: 3,
        };
        let mut source = MockMetadataSource::new().with_table("logs", def);
        let mut table = Table::new("logs", "ods_logs");

        let err = probe_table(&mut source, &mut table).await.unwrap_err();
        assert_eq!(err.kind(), "metadata");
        assert!(err.to_string().contains("primary key"));
    }

    #[tokio::test]
    async fn test_sequential_probe_aborts_on_first_failure() {
        let mut source = MockMetadataSource::new()
            .with_table("a", keyed_table(10))
            .with_table("b", keyed_table(10));
        source.fail_on = Some("b".into());
        let mut tables = vec![Table::new("a", "ods_a"), Table::new("b", "ods_b")];

        let err = probe_all_sequential(&mut source, &mut tables)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "metadata");
        // The first table was already probed when the phase aborted
        assert_eq!(tables[0].len(), 10);
    }
}
