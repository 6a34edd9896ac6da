//! Relational-result source.
//!
//! A [`Connection`] executes query text with bind parameters and hands back
//! a [`ResultCursor`]. [`ResultSetToRow`] turns the record under the cursor
//! into a [`Row`], dispatching on the declared SQL type of each column so
//! the native type survives (integers stay integers, nulls stay nulls).
//!
//! Column numbering on the cursor is 1-based. Row indices are assigned by a
//! counter starting at 1, so they are dense whatever the metadata says.

pub mod memory;

use crate::error::{CursorResult, SourceError, SourceResult};
use crate::logs::{log_error, log_info, log_info_indent};
use crate::models::{CellValue, OtherValue, Row};
use crate::source::Source;

pub use memory::{Fault, MemoryConnection, MemoryCursor, MemoryTable};

// =============================================================================
// SQL Types
// =============================================================================

/// Declared SQL type of a result column, keyed by standard SQL type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    LongNVarchar,
    Integer,
    Double,
    Boolean,
    Float,
    /// Any other type code, read through the generic accessor.
    Other(i32),
}

impl SqlType {
    pub const CHAR: i32 = 1;
    pub const VARCHAR: i32 = 12;
    pub const LONGVARCHAR: i32 = -1;
    pub const NCHAR: i32 = -15;
    pub const NVARCHAR: i32 = -9;
    pub const LONGNVARCHAR: i32 = -16;
    pub const INTEGER: i32 = 4;
    pub const DOUBLE: i32 = 8;
    pub const BOOLEAN: i32 = 16;
    pub const FLOAT: i32 = 6;

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::CHAR => SqlType::Char,
            Self::VARCHAR => SqlType::Varchar,
            Self::LONGVARCHAR => SqlType::LongVarchar,
            Self::NCHAR => SqlType::NChar,
            Self::NVARCHAR => SqlType::NVarchar,
            Self::LONGNVARCHAR => SqlType::LongNVarchar,
            Self::INTEGER => SqlType::Integer,
            Self::DOUBLE => SqlType::Double,
            Self::BOOLEAN => SqlType::Boolean,
            Self::FLOAT => SqlType::Float,
            other => SqlType::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            SqlType::Char => Self::CHAR,
            SqlType::Varchar => Self::VARCHAR,
            SqlType::LongVarchar => Self::LONGVARCHAR,
            SqlType::NChar => Self::NCHAR,
            SqlType::NVarchar => Self::NVARCHAR,
            SqlType::LongNVarchar => Self::LONGNVARCHAR,
            SqlType::Integer => Self::INTEGER,
            SqlType::Double => Self::DOUBLE,
            SqlType::Boolean => Self::BOOLEAN,
            SqlType::Float => Self::FLOAT,
            SqlType::Other(code) => *code,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            SqlType::Char
                | SqlType::Varchar
                | SqlType::LongVarchar
                | SqlType::NChar
                | SqlType::NVarchar
                | SqlType::LongNVarchar
        )
    }
}

// =============================================================================
// Cursor and Connection
// =============================================================================

/// A forward-only cursor over a query result.
///
/// Column arguments are 1-based. Typed accessors return `None` for SQL
/// NULL and an error when the value cannot be read as the requested type.
pub trait ResultCursor {
    /// Advance to the next record; `false` once the result is exhausted.
    fn next(&mut self) -> CursorResult<bool>;

    fn column_count(&self) -> CursorResult<usize>;
    fn column_type(&self, column: usize) -> CursorResult<SqlType>;
    fn column_name(&self, column: usize) -> CursorResult<String>;

    fn get_string(&self, column: usize) -> CursorResult<Option<String>>;
    fn get_int(&self, column: usize) -> CursorResult<Option<i32>>;
    fn get_double(&self, column: usize) -> CursorResult<Option<f64>>;
    fn get_boolean(&self, column: usize) -> CursorResult<Option<bool>>;
    fn get_float(&self, column: usize) -> CursorResult<Option<f32>>;

    /// Generic accessor returning the driver's value unmodified.
    fn get_object(&self, column: usize) -> CursorResult<Option<OtherValue>>;
}

/// Executes queries and opens cursors over their results.
pub trait Connection {
    type Cursor: ResultCursor;

    fn execute(&mut self, query: &str, params: &[CellValue]) -> CursorResult<Self::Cursor>;
}

// =============================================================================
// Adapter
// =============================================================================

/// Converts the record under a cursor into a [`Row`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSetToRow;

impl ResultSetToRow {
    /// Read every column of the current record.
    ///
    /// Any cursor fault aborts the whole record.
    pub fn apply<C: ResultCursor + ?Sized>(&self, cursor: &C) -> SourceResult<Row> {
        let mut row = Row::new();
        let column_count = cursor.column_count()?;
        let mut column_index = 0;

        for column in 1..=column_count {
            column_index += 1;
            let sql_type = cursor.column_type(column)?;
            let name = cursor.column_name(column)?;

            let value: CellValue = match sql_type {
                t if t.is_text() => cursor.get_string(column)?.into(),
                SqlType::Integer => cursor.get_int(column)?.into(),
                SqlType::Double => cursor.get_double(column)?.into(),
                SqlType::Boolean => cursor.get_boolean(column)?.into(),
                SqlType::Float => cursor.get_float(column)?.into(),
                _ => cursor.get_object(column)?.into(),
            };

            if value.is_null() {
                row.add_null_column(column_index, &name);
            } else {
                row.add_column(column_index, &name, value);
            }
        }
        Ok(row)
    }
}

/// Convenience wrapper around [`ResultSetToRow::apply`].
pub fn result_set_to_row<C: ResultCursor + ?Sized>(cursor: &C) -> SourceResult<Row> {
    ResultSetToRow.apply(cursor)
}

// =============================================================================
// Source
// =============================================================================

/// Source over the results of queries run on a [`Connection`].
///
/// Every [`Source::query`] executes again; the rows of the latest call are
/// kept and returned. The connection stays owned by this source and is
/// released when it is dropped.
pub struct ResultSetSource<C: Connection> {
    connection: C,
    default_query: Option<String>,
    adapter: ResultSetToRow,
    rows: Vec<Row>,
}

impl<C: Connection> ResultSetSource<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            default_query: None,
            adapter: ResultSetToRow,
            rows: Vec::new(),
        }
    }

    /// Query text used when `query` is called without one.
    pub fn with_default_query(mut self, query: impl Into<String>) -> Self {
        self.default_query = Some(query.into());
        self
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn into_connection(self) -> C {
        self.connection
    }
}

impl<C: Connection> Source for ResultSetSource<C> {
    fn query(&mut self, query: Option<&str>, params: &[CellValue]) -> SourceResult<&[Row]> {
        let sql = match query.or(self.default_query.as_deref()) {
            Some(sql) => sql.to_string(),
            None => {
                return Err(SourceError::UnsupportedQuery(
                    "relational source needs query text".to_string(),
                ))
            }
        };

        log_info(format!("Executing query: {}", sql));
        log_info_indent(format!("{} bound parameters", params.len()), 1);
        let mut cursor = self.connection.execute(&sql, params)?;
        let mut rows = Vec::new();
        while cursor.next()? {
            let row = self.adapter.apply(&cursor).map_err(|e| {
                log_error(format!("Record {} unreadable: {}", rows.len() + 1, e));
                e
            })?;
            rows.push(row);
        }
        log_info(format!("Query returned {} rows", rows.len()));

        self.rows = rows;
        Ok(&self.rows)
    }
}
