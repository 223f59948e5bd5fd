/*
 * Row sources: the cursor seam between split scanning and the database.
 *
 * Rows cross this seam already rendered to text, so the scanner state
 * machine stays database-free and testable.
 */

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use sqlx::mysql::MySqlPool;

use extract_common::{ExtractError, Result, SourceConfig, Split};

use crate::decode::decode_row;
use crate::sql::select_for_split;

/// Stream of rows from one split's cursor, each value pre-rendered to text.
pub type RowStream = BoxStream<'static, Result<Vec<Option<String>>>>;

/// One split-at-a-time cursor provider.
///
/// A source owns one connection and serves at most one open cursor; the
/// caller drops the previous stream before opening the next split.
#[async_trait]
pub trait RowSource: Send {
    /// Opens a cursor over one split.
    async fn open(&mut self, split: &Split) -> Result<RowStream>;

    /// Releases the underlying connection.
    async fn close(&mut self) -> Result<()>;
}

/// Row source backed by a single lazily-opened MySQL connection.
pub struct MySqlRowSource {
    pool: MySqlPool,
}

impl MySqlRowSource {
    /// Builds a source for the given descriptor. The connection itself is
    /// not opened until the first cursor.
    pub fn connect(source: &SourceConfig) -> Result<Self> {
        Ok(Self {
            pool: source.single_connection_pool()?,
        })
    }
}

#[async_trait]
impl RowSource for MySqlRowSource {
    async fn open(&mut self, split: &Split) -> Result<RowStream> {
        let sql = select_for_split(split)?;
        tracing::debug!(table = %split.table, sql = %sql, "opening split cursor");
        let table = split.table.clone();
        let pool = self.pool.clone();

        let stream = async_stream::try_stream! {
            let mut rows = sqlx::query(&sql).fetch(&pool);
            while let Some(row) = rows
                .try_next()
                .await
                .map_err(|e| ExtractError::Scan(format!("scanning `{}`: {}", table, e)))?
            {
                yield decode_row(&row)?;
            }
        };
        Ok(Box::pin(stream))
    }

    async fn close(&mut self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
