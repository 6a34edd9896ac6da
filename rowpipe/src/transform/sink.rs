//! Sinks: consumers of transformed records.

use std::io::Write;

use crate::error::{PipelineError, PipelineResult};
use crate::models::{Column, Row};

/// Receives one transformed record at a time.
pub trait Sink {
    fn accept(&mut self, columns: Vec<Column>) -> PipelineResult<()>;
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn accept(&mut self, columns: Vec<Column>) -> PipelineResult<()> {
        (**self).accept(columns)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn accept(&mut self, columns: Vec<Column>) -> PipelineResult<()> {
        (**self).accept(columns)
    }
}

/// Adapts a closure into a [`Sink`].
pub struct FnSink<F>(pub F);

impl<F: FnMut(Vec<Column>)> Sink for FnSink<F> {
    fn accept(&mut self, columns: Vec<Column>) -> PipelineResult<()> {
        (self.0)(columns);
        Ok(())
    }
}

/// Keeps every delivered record in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    records: Vec<Vec<Column>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Vec<Column>] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Vec<Column>> {
        self.records
    }
}

impl Sink for CollectingSink {
    fn accept(&mut self, columns: Vec<Column>) -> PipelineResult<()> {
        self.records.push(columns);
        Ok(())
    }
}

/// Writes each record as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn accept(&mut self, columns: Vec<Column>) -> PipelineResult<()> {
        let row: Row = columns.into_iter().collect();
        writeln!(self.writer, "{}", row.to_json()).map_err(|e| PipelineError::Sink(e.to_string()))
    }
}
