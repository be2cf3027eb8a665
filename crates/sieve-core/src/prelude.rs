//! Convenient re-exports for downstream crates.

pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::Hash256;
pub use crate::model::{Customer, DataSource, Money, Order, Product, Supplier};
pub use crate::record::Record;
pub use crate::types::Key;
