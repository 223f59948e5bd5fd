/*
 * Error types for the extraction engine.
 *
 * Errors are categorized by the phase that produced them:
 * - Metadata: catalog resolution and range probing, before any split exists
 * - Scan / Encoding: reading one unit of work, fatal for that unit only
 * - Config: an invalid job document
 *
 * There is no retry machinery here. A failed unit is re-scheduled (or not)
 * by the external execution host.
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Scan error: {0}")]
    Scan(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ExtractError {
    /// Short phase label, used in logs and task results.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Metadata(_) => "metadata",
            ExtractError::Scan(_) => "scan",
            ExtractError::Encoding(_) => "encoding",
            ExtractError::Config(_) => "config",
            ExtractError::Serialization(_) => "serialization",
            ExtractError::Unexpected(_) => "unexpected",
        }
    }

    /// Wraps this error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let ctx = context.into();
        match self {
            ExtractError::Metadata(msg) => ExtractError::Metadata(format!("{}: {}", ctx, msg)),
            ExtractError::Scan(msg) => ExtractError::Scan(format!("{}: {}", ctx, msg)),
            ExtractError::Encoding(msg) => ExtractError::Encoding(format!("{}: {}", ctx, msg)),
            ExtractError::Config(msg) => ExtractError::Config(format!("{}: {}", ctx, msg)),
            ExtractError::Unexpected(msg) => ExtractError::Unexpected(format!("{}: {}", ctx, msg)),
            // For errors with structured sources, wrap instead of rewriting
            e @ ExtractError::Serialization(_) => {
                ExtractError::Unexpected(format!("{}: {}", ctx, e))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Adds context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Adds context lazily (only evaluated on error).
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
