/*
 * Split chain scanning.
 *
 * A RowScanner walks one split chain in order: open a cursor for the
 * current split, drain it, drop it, open the next. Advancing is a flat
 * loop, so arbitrarily long chains cannot grow the stack. The active
 * split's cursor is released on every exit path, including errors;
 * earlier splits released theirs when they were exhausted.
 */

use extract_common::{ExtractError, Result, SourceConfig, Split, SplitGroup};
use futures::TryStreamExt;

use crate::encoder;
use crate::source::{MySqlRowSource, RowSource, RowStream};

/// Sequential reader over one split chain.
pub struct RowScanner<S> {
    source: S,
    splits: Vec<Split>,
    chain_length: u64,
    cursor: Option<RowStream>,
    next_split: usize,
    position: u64,
    key: Option<u64>,
    row: Option<String>,
    exhausted: bool,
    closed: bool,
}

impl RowScanner<MySqlRowSource> {
    /// Builds a scanner over its own single MySQL connection.
    pub fn connect(source: &SourceConfig, group: SplitGroup) -> Result<Self> {
        Ok(Self::new(MySqlRowSource::connect(source)?, group))
    }
}

impl<S: RowSource> RowScanner<S> {
    pub fn new(source: S, group: SplitGroup) -> Self {
        let chain_length = group.total_rows();
        Self {
            source,
            splits: group.splits,
            chain_length,
            cursor: None,
            next_split: 0,
            position: 0,
            key: None,
            row: None,
            exhausted: false,
            closed: false,
        }
    }

    /// Moves to the next row, crossing split boundaries transparently.
    ///
    /// Returns false once the chain is exhausted (and keeps returning
    /// false). A database error closes the scanner and propagates.
    pub async fn advance(&mut self) -> Result<bool> {
        if self.closed || self.exhausted {
            return Ok(false);
        }
        loop {
            if self.cursor.is_none() {
                match self.open_next().await {
                    Ok(true) => {}
                    Ok(false) => {
                        self.exhausted = true;
                        self.key = None;
                        self.row = None;
                        return Ok(false);
                    }
                    Err(e) => return self.fail(e).await,
                }
            }
            let Some(stream) = self.cursor.as_mut() else {
                continue;
            };
            match stream.try_next().await {
                Ok(Some(values)) => {
                    self.key = Some(self.position);
                    self.position += 1;
                    self.row = Some(encoder::encode_record(&values));
                    return Ok(true);
                }
                // Current split drained: drop its cursor, loop to the next
                Ok(None) => self.cursor = None,
                Err(e) => return self.fail(e).await,
            }
        }
    }

    /// 0-based position of the current row across the whole chain.
    pub fn current_key(&self) -> Option<u64> {
        self.key
    }

    /// The current row as an encoded text record.
    pub fn current_row(&self) -> Option<&str> {
        self.row.as_deref()
    }

    /// Fraction of the chain scanned so far; 1.0 for an empty chain.
    pub fn progress(&self) -> f32 {
        if self.chain_length == 0 {
            return 1.0;
        }
        (self.position as f32 / self.chain_length as f32).min(1.0)
    }

    /// Rows emitted so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Splits whose cursor has been opened so far.
    pub fn splits_opened(&self) -> usize {
        self.next_split
    }

    /// Releases the active cursor and the connection. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cursor = None;
        self.source.close().await
    }

    async fn open_next(&mut self) -> Result<bool> {
        let Some(split) = self.splits.get(self.next_split) else {
            return Ok(false);
        };
        tracing::debug!(
            table = %split.table,
            start = split.start,
            end = split.end,
            "advancing to next split"
        );
        let stream = self.source.open(split).await?;
        self.cursor = Some(stream);
        self.next_split += 1;
        Ok(true)
    }

    async fn fail(&mut self, error: ExtractError) -> Result<bool> {
        if let Err(close_error) = self.close().await {
            tracing::warn!(error = %close_error, "error releasing scan resources");
        }
        Err(error)
    }
}
