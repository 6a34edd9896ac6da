//! Row/Column data model shared by every source.
//!
//! - [`CellValue`] - Typed slot of one field (null, string, integer, ...)
//! - [`OtherValue`] - Opaque fallback for values without a dedicated slot
//! - [`Column`] - One labeled field of one record
//! - [`Row`] - Ordered, mutable collection of columns keyed by index and name

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};

// =============================================================================
// Cell Values
// =============================================================================

/// Value of a relational column whose declared type has no dedicated slot.
///
/// Carried unmodified from the cursor's generic accessor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OtherValue {
    Text(String),
    Long(i64),
    Decimal(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
    Json(Value),
}

impl fmt::Display for OtherValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtherValue::Text(v) => f.write_str(v),
            OtherValue::Long(v) => write!(f, "{}", v),
            OtherValue::Decimal(v) => f.write_str(v),
            OtherValue::Date(v) => write!(f, "{}", v),
            OtherValue::Timestamp(v) => write!(f, "{}", v),
            OtherValue::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            OtherValue::Json(v) => write!(f, "{}", v),
        }
    }
}

/// Typed slot of a single cell.
///
/// Text sources only ever produce [`CellValue::Null`] and
/// [`CellValue::String`]; relational sources keep the native type.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    String(String),
    Integer(i32),
    Double(f64),
    Boolean(bool),
    Float(f32),
    Other(OtherValue),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            CellValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_other(&self) -> Option<&OtherValue> {
        match self {
            CellValue::Other(v) => Some(v),
            _ => None,
        }
    }

    /// JSON rendition used by row serialization.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("null"),
            CellValue::String(v) => f.write_str(v),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Double(v) => write!(f, "{}", v),
            CellValue::Boolean(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Integer(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Double(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Boolean(v)
    }
}

impl From<f32> for CellValue {
    fn from(v: f32) -> Self {
        CellValue::Float(v)
    }
}

impl From<OtherValue> for CellValue {
    fn from(v: OtherValue) -> Self {
        CellValue::Other(v)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

// =============================================================================
// Column
// =============================================================================

/// One field of one record: positional index, name and typed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    index: usize,
    name: String,
    value: CellValue,
}

impl Column {
    /// Create a column. An empty name falls back to the stringified index.
    pub fn new(index: usize, name: impl Into<String>, value: impl Into<CellValue>) -> Self {
        let name = name.into();
        let name = if name.is_empty() { index.to_string() } else { name };
        Self {
            index,
            name,
            value: value.into(),
        }
    }

    /// Create an explicitly-null column.
    pub fn null(index: usize, name: impl Into<String>) -> Self {
        Self::new(index, name, CellValue::Null)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn set_value(&mut self, value: impl Into<CellValue>) {
        self.value = value.into();
    }

    /// Consume the column and return it holding `value`.
    pub fn change_value(mut self, value: impl Into<CellValue>) -> Self {
        self.set_value(value);
        self
    }

    /// Consume the column and return it under `name`.
    pub fn change_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Consume the column and return it at `index`.
    pub fn change_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn into_value(self) -> CellValue {
        self.value
    }
}

// =============================================================================
// Row
// =============================================================================

/// Ordered, mutable collection of columns for one record.
///
/// Columns are keyed by index; indices may be sparse and enumeration is
/// always in ascending index order. A name already held by a column at a
/// different index is not reused: the new column is named by its index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    columns: BTreeMap<usize, Column>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the column at `index` with a typed value.
    pub fn add_column(
        &mut self,
        index: usize,
        name: &str,
        value: impl Into<CellValue>,
    ) -> &mut Self {
        let name = self.resolve_name(index, name);
        self.columns.insert(index, Column::new(index, name, value));
        self
    }

    /// Add or replace the column at `index` with an explicit null.
    pub fn add_null_column(&mut self, index: usize, name: &str) -> &mut Self {
        self.add_column(index, name, CellValue::Null)
    }

    /// Insert an already-built column, keeping the naming rule.
    pub fn put_column(&mut self, column: Column) -> &mut Self {
        let Column { index, name, value } = column;
        self.add_column(index, &name, value)
    }

    /// Rename the column at `index`, keeping its value.
    ///
    /// Returns `false` when no column exists at `index`.
    pub fn rename_column(&mut self, index: usize, name: &str) -> bool {
        let name = self.resolve_name(index, name);
        match self.columns.get_mut(&index) {
            Some(column) => {
                column.name = name;
                true
            }
            None => false,
        }
    }

    pub fn get_column_by_index(&self, index: usize) -> Option<&Column> {
        self.columns.get(&index)
    }

    pub fn get_column_by_index_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(&index)
    }

    pub fn get_column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.values().find(|c| c.name == name)
    }

    pub fn get_column_by_name_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.values_mut().find(|c| c.name == name)
    }

    pub fn remove_column(&mut self, index: usize) -> Option<Column> {
        self.columns.remove(&index)
    }

    /// Columns in ascending index order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns.into_values().collect()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.values().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// JSON object keyed by column name.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for column in self.columns.values() {
            obj.insert(column.name.clone(), column.value.to_json());
        }
        Value::Object(obj)
    }

    fn resolve_name(&self, index: usize, name: &str) -> String {
        let taken = self
            .columns
            .values()
            .any(|c| c.index != index && c.name == name);
        if name.is_empty() || taken {
            index.to_string()
        } else {
            name.to_string()
        }
    }
}

impl FromIterator<Column> for Row {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        let mut row = Row::new();
        for column in iter {
            row.put_column(column);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_and_lookup() {
        let mut row = Row::new();
        row.add_column(0, "name", "duke").add_column(1, "age", 42);

        assert_eq!(row.len(), 2);
        assert_eq!(row.get_column_by_name("name").unwrap().value().as_str(), Some("duke"));
        assert_eq!(row.get_column_by_index(1).unwrap().value().as_i32(), Some(42));
        assert!(row.get_column_by_name("missing").is_none());
    }

    #[test]
    fn test_null_column_is_explicit() {
        let mut row = Row::new();
        row.add_null_column(3, "active");

        let column = row.get_column_by_index(3).unwrap();
        assert!(column.is_null());
        assert_eq!(column.name(), "active");
        assert_eq!(column.value().as_str(), None);
    }

    #[test]
    fn test_enumeration_in_index_order() {
        let mut row = Row::new();
        row.add_column(5, "e", "5");
        row.add_column(0, "a", "0");
        row.add_column(2, "c", "2");

        let indices: Vec<usize> = row.columns().map(Column::index).collect();
        assert_eq!(indices, vec![0, 2, 5]);
        assert_eq!(row.column_names(), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_empty_or_duplicate_name_falls_back_to_index() {
        let mut row = Row::new();
        row.add_column(0, "", "x");
        row.add_column(1, "city", "paris");
        row.add_column(2, "city", "lyon");

        assert_eq!(row.get_column_by_index(0).unwrap().name(), "0");
        assert_eq!(row.get_column_by_index(2).unwrap().name(), "2");
        assert_eq!(row.get_column_by_name("city").unwrap().index(), 1);
    }

    #[test]
    fn test_rewrite_same_index_replaces_column() {
        let mut row = Row::new();
        row.add_column(0, "city", "paris");
        row.add_column(0, "city", "lyon");

        assert_eq!(row.len(), 1);
        assert_eq!(row.get_column_by_index(0).unwrap().value().as_str(), Some("lyon"));
    }

    #[test]
    fn test_rename_keeps_value() {
        let mut row = Row::new();
        row.add_column(0, "0", "paris");

        assert!(row.rename_column(0, "city"));
        let column = row.get_column_by_index(0).unwrap();
        assert_eq!(column.name(), "city");
        assert_eq!(column.value().as_str(), Some("paris"));

        assert!(!row.rename_column(9, "nowhere"));
    }

    #[test]
    fn test_to_json_keyed_by_name() {
        let mut row = Row::new();
        row.add_column(1, "city", "paris")
            .add_column(2, "id", 7)
            .add_null_column(3, "active")
            .add_column(4, "ratio", 0.5f64);

        assert_eq!(
            row.to_json(),
            json!({"city": "paris", "id": 7, "active": null, "ratio": 0.5})
        );
    }

    #[test]
    fn test_other_value_serialization() {
        let date = NaiveDate::from_ymd_opt(2014, 9, 1).unwrap();
        let value = CellValue::from(OtherValue::Date(date));
        assert_eq!(value.to_json(), json!("2014-09-01"));
        assert_eq!(value.to_string(), "2014-09-01");

        let long = CellValue::from(OtherValue::Long(9_000_000_000));
        assert_eq!(long.to_json(), json!(9_000_000_000i64));
    }

    #[test]
    fn test_option_into_cell_value() {
        assert!(CellValue::from(None::<i32>).is_null());
        assert_eq!(CellValue::from(Some(true)), CellValue::Boolean(true));
    }

    #[test]
    fn test_collect_columns_into_row() {
        let row: Row = vec![Column::new(1, "b", "2"), Column::null(0, "a")]
            .into_iter()
            .collect();

        assert_eq!(row.column_names(), vec!["a", "b"]);
        assert!(row.get_column_by_index(0).unwrap().is_null());
    }
}
