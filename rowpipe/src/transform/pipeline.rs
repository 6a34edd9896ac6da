//! Row pipeline: source, per-row hooks, column transformations, sink.
//!
//! # Example
//!
//! ```rust,ignore
//! use rowpipe::{CollectingSink, CsvStreamSource, Pipeline};
//!
//! let source = CsvStreamSource::new(input.as_bytes(), ",", "UTF-8", true)?;
//! let mut sink = CollectingSink::new();
//! let stats = Pipeline::new(source)
//!     .with_name("name", |c| vec![c.change_value("duke")])
//!     .to(&mut sink)
//!     .go(None, &[])?;
//! ```

use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_error, log_info_indent, log_success, log_warning};
use crate::models::{CellValue, Column, Row};
use crate::source::Source;

use super::sink::Sink;

type RowHook<'a> = Box<dyn FnMut(Row) -> Row + 'a>;
type ColumnFn<'a> = Box<dyn FnMut(Column) -> Result<Vec<Column>, String> + 'a>;

/// Column selected by a transformation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    Index(usize),
}

struct Step<'a> {
    target: Target,
    function: ColumnFn<'a>,
}

/// Counters of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Rows produced by the source
    pub rows_read: usize,
    /// Records handed to the sink
    pub rows_delivered: usize,
    /// Rows left without columns after transformation
    pub rows_dropped: usize,
}

/// Drives rows from a source through transformations into a sink.
///
/// Per row: `start_with` hooks, then column steps in registration order,
/// then `end_with` hooks. A step's function replaces its target column
/// with the columns it returns; a step whose target is absent is skipped.
pub struct Pipeline<'a> {
    source: Box<dyn Source + 'a>,
    pre: Vec<RowHook<'a>>,
    steps: Vec<Step<'a>>,
    post: Vec<RowHook<'a>>,
    sink: Option<Box<dyn Sink + 'a>>,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: impl Source + 'a) -> Self {
        Self {
            source: Box::new(source),
            pre: Vec::new(),
            steps: Vec::new(),
            post: Vec::new(),
            sink: None,
        }
    }

    /// Row hook run before column steps.
    pub fn start_with(mut self, hook: impl FnMut(Row) -> Row + 'a) -> Self {
        self.pre.push(Box::new(hook));
        self
    }

    /// Row hook run after column steps.
    pub fn end_with(mut self, hook: impl FnMut(Row) -> Row + 'a) -> Self {
        self.post.push(Box::new(hook));
        self
    }

    pub fn with_name(
        self,
        name: impl Into<String>,
        mut function: impl FnMut(Column) -> Vec<Column> + 'a,
    ) -> Self {
        self.step(Target::Name(name.into()), Box::new(move |c| Ok(function(c))))
    }

    pub fn with_index(
        self,
        index: usize,
        mut function: impl FnMut(Column) -> Vec<Column> + 'a,
    ) -> Self {
        self.step(Target::Index(index), Box::new(move |c| Ok(function(c))))
    }

    /// Fallible step; an `Err` aborts the run.
    pub fn with_checked(
        self,
        target: Target,
        function: impl FnMut(Column) -> Result<Vec<Column>, String> + 'a,
    ) -> Self {
        self.step(target, Box::new(function))
    }

    pub fn to(mut self, sink: impl Sink + 'a) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Run the pipeline once over the rows of `query`.
    pub fn go(&mut self, query: Option<&str>, params: &[CellValue]) -> PipelineResult<PipelineStats> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| PipelineError::Sink("no sink configured".to_string()))?;
        let rows = self.source.query(query, params)?;
        let mut stats = PipelineStats::default();

        for source_row in rows {
            stats.rows_read += 1;
            let mut row = source_row.clone();

            for hook in self.pre.iter_mut() {
                row = hook(row);
            }
            for step in self.steps.iter_mut() {
                row = apply_step(step, row)?;
            }
            for hook in self.post.iter_mut() {
                row = hook(row);
            }

            if row.is_empty() {
                stats.rows_dropped += 1;
                continue;
            }
            sink.accept(row.into_columns())?;
            stats.rows_delivered += 1;
        }

        log_success(format!("Delivered {} of {} rows", stats.rows_delivered, stats.rows_read));
        if stats.rows_dropped > 0 {
            log_warning(format!("{} rows dropped after transformation", stats.rows_dropped));
        }
        Ok(stats)
    }

    fn step(mut self, target: Target, function: ColumnFn<'a>) -> Self {
        log_info_indent(format!("Registered transformation on {:?}", target), 1);
        self.steps.push(Step { target, function });
        self
    }
}

fn apply_step(step: &mut Step<'_>, mut row: Row) -> PipelineResult<Row> {
    let index = match &step.target {
        Target::Index(index) => Some(*index),
        Target::Name(name) => row.get_column_by_name(name).map(Column::index),
    };
    let column = match index.and_then(|i| row.remove_column(i)) {
        Some(column) => column,
        None => return Ok(row),
    };

    let name = column.name().to_string();
    let produced = (step.function)(column).map_err(|message| {
        log_error(format!("Transformation of '{}' failed: {}", name, message));
        PipelineError::Transformation { column: name, message }
    })?;
    for column in produced {
        row.put_column(column);
    }
    Ok(row)
}
