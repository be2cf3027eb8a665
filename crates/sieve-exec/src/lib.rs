#![forbid(unsafe_code)]
//! sieve-exec: the engine, its named pipelines, and the pipeline catalog.
//!
//! Every pipeline method returns a `Query` and does no work until consumed.
//! The catalog runs pipelines by name and encodes their rows as JSON values
//! for whatever presentation layer sits on top.

pub mod adhoc;
pub mod catalog;
pub mod metrics;
pub mod rows;
pub mod runtime;

pub use adhoc::{AdhocQuery, Collection};
pub use catalog::{Catalog, PipelineInfo, Section};
pub use runtime::{Engine, ExecError};
