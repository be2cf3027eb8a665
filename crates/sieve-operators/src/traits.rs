//! Common operator interfaces.

use thiserror::Error;

/// Type-erased lazy sequence.
pub type BoxIter<'a, T> = Box<dyn Iterator<Item = T> + 'a>;

/// Errors from the runtime-configured operators (field predicates, dynamic
/// aggregations). Typed operators over well-formed records are total.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type error: {0}")]
    Type(String),
}
