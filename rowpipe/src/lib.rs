//! # Rowpipe - row-oriented extract/transform/load
//!
//! Rowpipe reads tabular data from delimited text or relational query
//! results, represents every record as a mutable column-indexed [`Row`],
//! runs per-row and per-column transformations and hands the result to a
//! [`Sink`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Text stream │────▶│   Parser    │──┐  │             │     │             │
//! │ (charset)   │     │ (quote-aw.) │  ├─▶│  Pipeline   │────▶│    Sink     │
//! │ SQL cursor  │────▶│  Adapter    │──┘  │ (hooks/cols)│     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rowpipe::{CsvStreamSource, Source};
//!
//! let mut source = CsvStreamSource::new("name,age\nduke,42\n".as_bytes(), ",", "UTF-8", true)?;
//! for row in source.query(None, &[])? {
//!     println!("{}", row.to_json());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Row/Column data model
//! - [`source`] - Source capability
//! - [`parser`] - Delimited-text source
//! - [`relational`] - Relational-result adapter and source
//! - [`transform`] - Pipeline and sinks
//! - [`config`] - Source configuration
//! - [`logs`] - Log broadcasting

// Core modules
pub mod error;
pub mod logs;
pub mod models;
pub mod source;

// Ingestion
pub mod parser;
pub mod relational;

// Transformation
pub mod transform;

// Configuration
pub mod config;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, CursorError, CursorResult, PipelineError, PipelineResult,
    SourceError, SourceResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{CellValue, Column, OtherValue, Row};

// =============================================================================
// Re-exports - Sources
// =============================================================================

pub use source::Source;

pub use parser::{
    detect_charset, resolve_charset, split_line, split_lines, CsvStreamSource, HeaderRegistry, ParsedLine,
    AUTO_CHARSET,
};

pub use relational::{
    result_set_to_row, Connection, Fault, MemoryConnection, MemoryCursor, MemoryTable,
    ResultCursor, ResultSetSource, ResultSetToRow, SqlType,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::{
    CollectingSink, FnSink, JsonLinesSink, Pipeline, PipelineStats, Sink, Target,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::CsvSourceConfig;
