//! Source capability: produce the rows of one ingestion session.
//!
//! Two implementations exist: [`crate::parser::CsvStreamSource`] for
//! delimited text and [`crate::relational::ResultSetSource`] for relational
//! query results. Orchestration code depends on [`Source`] only.
//!
//! A source is driven by one caller for its whole lifetime; `query` takes
//! `&mut self` because it realizes and caches rows in place.

use crate::error::SourceResult;
use crate::models::{CellValue, Row};

pub trait Source {
    /// Produce the ordered rows of this source.
    ///
    /// `query` and `params` are the query text and bind parameters for
    /// relational sources. Text sources ignore them.
    fn query(&mut self, query: Option<&str>, params: &[CellValue]) -> SourceResult<&[Row]>;
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn query(&mut self, query: Option<&str>, params: &[CellValue]) -> SourceResult<&[Row]> {
        (**self).query(query, params)
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn query(&mut self, query: Option<&str>, params: &[CellValue]) -> SourceResult<&[Row]> {
        (**self).query(query, params)
    }
}
