//! Error types for the rowpipe ingestion and transformation layers.
//!
//! - [`ConfigError`] - Source configuration errors (charset, delimiter)
//! - [`CursorError`] - Data-access faults raised by a relational cursor
//! - [`SourceError`] - Ingestion errors surfaced by a [`crate::Source`]
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while configuring a source. Never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The charset label is not a known IANA name or alias.
    #[error("Unknown charset: '{0}'")]
    UnknownCharset(String),

    /// The delimiter string is empty.
    #[error("Delimiter must not be empty")]
    EmptyDelimiter,

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file is not valid JSON.
    #[error("Configuration JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("Configuration IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Cursor Errors
// =============================================================================

/// A fault reported by a relational cursor while reading metadata or values.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CursorError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl CursorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a driver-level error, keeping it reachable through `source()`.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// =============================================================================
// Source Errors
// =============================================================================

/// Errors surfaced by a source while ingesting rows.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source configuration rejected at initialization.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The underlying stream could not be read.
    #[error("Failed to read stream: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata or a value of the current record could not be read.
    #[error("Problems accessing result cursor: {0}")]
    ResultAccess(#[source] CursorError),

    /// The source cannot run the requested query.
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),
}

impl From<CursorError> for SourceError {
    fn from(err: CursorError) -> Self {
        SourceError::ResultAccess(err)
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Ingestion error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// A column transformation refused its input.
    #[error("Transformation failed on column '{column}': {message}")]
    Transformation { column: String, message: String },

    /// The sink rejected a record.
    #[error("Sink error: {0}")]
    Sink(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for cursor operations.
pub type CursorResult<T> = Result<T, CursorError>;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_conversion_chain() {
        let config_err = ConfigError::UnknownCharset("klingon-8".into());
        let source_err: SourceError = config_err.into();
        assert!(source_err.to_string().contains("klingon-8"));

        let pipeline_err: PipelineError = source_err.into();
        assert!(pipeline_err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_cursor_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection reset");
        let err: SourceError = CursorError::with_source("reading column 2", io).into();

        let msg = err.to_string();
        assert!(msg.contains("Problems accessing result cursor"));
        assert!(msg.contains("reading column 2"));

        let cursor = err.source().expect("cursor error is the source");
        let root = cursor.source().expect("driver error is preserved");
        assert_eq!(root.to_string(), "connection reset");
    }

    #[test]
    fn test_bare_cursor_error_has_no_cause() {
        let err = CursorError::new("column count unavailable");
        assert_eq!(err.to_string(), "column count unavailable");
        assert_eq!(err.message(), "column count unavailable");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_transformation_error_format() {
        let err = PipelineError::Transformation {
            column: "age".into(),
            message: "not a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("age"));
        assert!(msg.contains("not a number"));
    }
}
