//! In-memory relational results.
//!
//! [`MemoryConnection`] maps query text to canned [`MemoryTable`] results and
//! records every execution. [`Fault`] makes a cursor fail on metadata or on
//! a single value, the way a broken driver connection would.

use std::collections::HashMap;

use serde_json::Value;

use super::{Connection, ResultCursor, SqlType};
use crate::error::{CursorError, CursorResult};
use crate::models::{CellValue, OtherValue};

/// Injected cursor failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Every metadata read fails.
    Metadata,
    /// Reading `column` (1-based) of `record` (0-based) fails.
    Value { record: usize, column: usize },
}

/// Declared columns plus records of a result.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<(String, SqlType)>,
    records: Vec<Vec<CellValue>>,
    fault: Option<Fault>,
}

impl MemoryTable {
    pub fn new<S: Into<String>>(columns: Vec<(S, SqlType)>) -> Self {
        Self {
            columns: columns.into_iter().map(|(n, t)| (n.into(), t)).collect(),
            records: Vec::new(),
            fault: None,
        }
    }

    /// Append a record; missing trailing values read as NULL.
    pub fn with_record(mut self, record: Vec<CellValue>) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cursor positioned before the first record.
    pub fn cursor(&self) -> MemoryCursor {
        MemoryCursor {
            table: self.clone(),
            position: None,
        }
    }
}

/// Forward-only cursor over a [`MemoryTable`].
#[derive(Debug, Clone)]
pub struct MemoryCursor {
    table: MemoryTable,
    position: Option<usize>,
}

impl MemoryCursor {
    fn check_metadata(&self, column: usize) -> CursorResult<()> {
        if self.table.fault == Some(Fault::Metadata) {
            return Err(CursorError::new("metadata unavailable"));
        }
        if column == 0 || column > self.table.columns.len() {
            return Err(CursorError::new(format!(
                "column {} out of range 1..={}",
                column,
                self.table.columns.len()
            )));
        }
        Ok(())
    }

    fn value(&self, column: usize) -> CursorResult<&CellValue> {
        self.check_metadata(column)?;
        let record = self
            .position
            .ok_or_else(|| CursorError::new("cursor is not positioned on a record"))?;
        if self.table.fault == Some(Fault::Value { record, column }) {
            return Err(CursorError::new(format!(
                "failed reading column {} of record {}",
                column, record
            )));
        }
        static NULL: CellValue = CellValue::Null;
        Ok(self
            .table
            .records
            .get(record)
            .and_then(|r| r.get(column - 1))
            .unwrap_or(&NULL))
    }

    fn mismatch(column: usize, expected: &str, found: &CellValue) -> CursorError {
        CursorError::new(format!(
            "column {} holds '{}', not a {}",
            column, found, expected
        ))
    }
}

impl ResultCursor for MemoryCursor {
    fn next(&mut self) -> CursorResult<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.table.records.len()));
        Ok(next < self.table.records.len())
    }

    fn column_count(&self) -> CursorResult<usize> {
        if self.table.fault == Some(Fault::Metadata) {
            return Err(CursorError::new("metadata unavailable"));
        }
        Ok(self.table.columns.len())
    }

    fn column_type(&self, column: usize) -> CursorResult<SqlType> {
        self.check_metadata(column)?;
        Ok(self.table.columns[column - 1].1)
    }

    fn column_name(&self, column: usize) -> CursorResult<String> {
        self.check_metadata(column)?;
        Ok(self.table.columns[column - 1].0.clone())
    }

    fn get_string(&self, column: usize) -> CursorResult<Option<String>> {
        match self.value(column)? {
            CellValue::Null => Ok(None),
            CellValue::String(s) => Ok(Some(s.clone())),
            CellValue::Other(OtherValue::Text(s)) => Ok(Some(s.clone())),
            other => Ok(Some(other.to_string())),
        }
    }

    fn get_int(&self, column: usize) -> CursorResult<Option<i32>> {
        match self.value(column)? {
            CellValue::Null => Ok(None),
            CellValue::Integer(v) => Ok(Some(*v)),
            other => Err(Self::mismatch(column, "integer", other)),
        }
    }

    fn get_double(&self, column: usize) -> CursorResult<Option<f64>> {
        match self.value(column)? {
            CellValue::Null => Ok(None),
            CellValue::Double(v) => Ok(Some(*v)),
            CellValue::Float(v) => Ok(Some(f64::from(*v))),
            CellValue::Integer(v) => Ok(Some(f64::from(*v))),
            other => Err(Self::mismatch(column, "double", other)),
        }
    }

    fn get_boolean(&self, column: usize) -> CursorResult<Option<bool>> {
        match self.value(column)? {
            CellValue::Null => Ok(None),
            CellValue::Boolean(v) => Ok(Some(*v)),
            other => Err(Self::mismatch(column, "boolean", other)),
        }
    }

    fn get_float(&self, column: usize) -> CursorResult<Option<f32>> {
        match self.value(column)? {
            CellValue::Null => Ok(None),
            CellValue::Float(v) => Ok(Some(*v)),
            CellValue::Integer(v) => Ok(Some(*v as f32)),
            other => Err(Self::mismatch(column, "float", other)),
        }
    }

    fn get_object(&self, column: usize) -> CursorResult<Option<OtherValue>> {
        let value = match self.value(column)? {
            CellValue::Null => return Ok(None),
            CellValue::Other(v) => v.clone(),
            CellValue::String(s) => OtherValue::Text(s.clone()),
            CellValue::Integer(v) => OtherValue::Long(i64::from(*v)),
            CellValue::Boolean(v) => OtherValue::Json(Value::Bool(*v)),
            other => OtherValue::Json(other.to_json()),
        };
        Ok(Some(value))
    }
}

/// Connection answering queries from registered results.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnection {
    results: HashMap<String, MemoryTable>,
    executed: Vec<(String, Vec<CellValue>)>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the result returned for `query`.
    pub fn with_result(mut self, query: impl Into<String>, table: MemoryTable) -> Self {
        self.results.insert(query.into(), table);
        self
    }

    /// Every executed query with its parameters, in order.
    pub fn executed(&self) -> &[(String, Vec<CellValue>)] {
        &self.executed
    }
}

impl Connection for MemoryConnection {
    type Cursor = MemoryCursor;

    fn execute(&mut self, query: &str, params: &[CellValue]) -> CursorResult<MemoryCursor> {
        self.executed.push((query.to_string(), params.to_vec()));
        self.results
            .get(query)
            .map(MemoryTable::cursor)
            .ok_or_else(|| CursorError::new(format!("no result registered for query '{}'", query)))
    }
}
