//! Transformation module.
//!
//! This module drives ingested rows to their consumer:
//! - Pipeline: per-row hooks and per-column transformation steps
//! - Sink: consumers of transformed records

pub mod pipeline;
pub mod sink;

pub use pipeline::{Pipeline, PipelineStats, Target};
pub use sink::{CollectingSink, FnSink, JsonLinesSink, Sink};
