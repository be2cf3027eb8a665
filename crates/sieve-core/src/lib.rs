#![forbid(unsafe_code)]
//! sieve-core: record model, key values, configs, errors, and snapshot hashing.
//!
//! Design intent:
//! - Pure data; no iteration machinery, no IO.
//! - Everything here is an immutable snapshot once loaded. Operators borrow
//!   it; nothing downstream mutates it.

pub mod config;
pub mod error;
pub mod hash;
pub mod model;
pub mod prelude;
pub mod record;
pub mod types;
