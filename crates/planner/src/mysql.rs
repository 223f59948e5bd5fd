/*
 * MySQL metadata source.
 *
 * Schema facts come from information_schema scoped to the connection's
 * current schema; ranges come from MIN/MAX and COUNT aggregates on the
 * table itself.
 */

use async_trait::async_trait;
use sqlx::{MySqlConnection, Row};

use extract_common::{ExtractError, Result, SourceConfig};

use crate::catalog::MetadataSource;
use crate::table::ColumnMeta;

/// Metadata source over one MySQL connection.
pub struct MySqlMetadataSource {
    conn: MySqlConnection,
}

impl MySqlMetadataSource {
    /// Opens a fresh connection for this source.
    pub async fn connect(source: &SourceConfig) -> Result<Self> {
        Ok(Self {
            conn: source.connect().await?,
        })
    }

    pub fn from_connection(conn: MySqlConnection) -> Self {
        Self { conn }
    }

    async fn fetch_columns(&mut self, table: &str, keys_only: bool) -> Result<Vec<ColumnMeta>> {
        let mut sql = String::from(
            "SELECT COLUMN_NAME, DATA_TYPE, ORDINAL_POSITION \
             FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?",
        );
        if keys_only {
            sql.push_str(" AND COLUMN_KEY = 'PRI'");
        }
        sql.push_str(" ORDER BY ORDINAL_POSITION");

        let rows = sqlx::query(&sql)
            .bind(table)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| {
                ExtractError::Metadata(format!("column query for `{}` failed: {}", table, e))
            })?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("COLUMN_NAME").map_err(|e| {
                    ExtractError::Metadata(format!("bad column metadata for `{}`: {}", table, e))
                })?;
                let type_name: String = row.try_get("DATA_TYPE").map_err(|e| {
                    ExtractError::Metadata(format!("bad column metadata for `{}`: {}", table, e))
                })?;
                let ordinal: u64 = row.try_get("ORDINAL_POSITION").map_err(|e| {
                    ExtractError::Metadata(format!("bad column metadata for `{}`: {}", table, e))
                })?;
                Ok(ColumnMeta::new(name, type_name, ordinal as u32))
            })
            .collect()
    }
}

#[async_trait]
impl MetadataSource for MySqlMetadataSource {
    async fn list_tables(&mut self, pattern: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT TABLE_NAME \
             FROM information_schema.TABLES \
             WHERE TABLE_SCHEMA = DATABASE() \
               AND TABLE_TYPE = 'BASE TABLE' \
               AND TABLE_NAME LIKE ? \
             ORDER BY TABLE_NAME",
        )
        .bind(pattern)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| {
            ExtractError::Metadata(format!("table listing for `{}` failed: {}", pattern, e))
        })?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("TABLE_NAME").map_err(|e| {
                    ExtractError::Metadata(format!("bad table listing row: {}", e))
                })
            })
            .collect()
    }

    async fn primary_key_columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>> {
        self.fetch_columns(table, true).await
    }

    async fn columns(&mut self, table: &str) -> Result<Vec<ColumnMeta>> {
        self.fetch_columns(table, false).await
    }

    async fn key_range(&mut self, table: &str, key: &str) -> Result<Option<(i64, i64)>> {
        let sql = format!(
            "SELECT MIN({key}) AS min_id, MAX({key}) AS max_id FROM {table}",
            key = quote_identifier(key),
            table = quote_identifier(table),
        );
        let row = sqlx::query(&sql)
            .fetch_one(&mut self.conn)
            .await
            .map_err(|e| {
                ExtractError::Metadata(format!("range query for `{}` failed: {}", table, e))
            })?;

        let min: Option<i64> = row.try_get("min_id").map_err(|e| {
            ExtractError::Metadata(format!(
                "split key `{}` of `{}` is not integer-valued: {}",
                key, table, e
            ))
        })?;
        let max: Option<i64> = row.try_get("max_id").map_err(|e| {
            ExtractError::Metadata(format!(
                "split key `{}` of `{}` is not integer-valued: {}",
                key, table, e
            ))
        })?;

        match (min, max) {
            (Some(min), Some(max)) => Ok(Some((min, max))),
            _ => Ok(None),
        }
    }

    async fn row_count(&mut self, table: &str) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(0) AS total_count FROM {}",
            quote_identifier(table)
        );
        let row = sqlx::query(&sql)
            .fetch_one(&mut self.conn)
            .await
            .map_err(|e| {
                ExtractError::Metadata(format!("count query for `{}` failed: {}", table, e))
            })?;
        row.try_get("total_count")
            .map_err(|e| ExtractError::Metadata(format!("bad count row for `{}`: {}", table, e)))
    }
}

/// Backtick-quotes an identifier, doubling embedded backticks.
fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_backticks() {
        assert_eq!(quote_identifier("orders"), "`orders`");
        assert_eq!(quote_identifier("odd`name"), "`odd``name`");
    }
}
