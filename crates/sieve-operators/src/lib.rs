#![forbid(unsafe_code)]
//! sieve-operators: lazy operators (filter/project/join/group/sort/aggregate).
//!
//! Design intent:
//! - Pure and synchronous. Operators borrow their inputs and never mutate them.
//! - Adaptors are lazy: nothing is pulled from an input until the adaptor
//!   itself is first polled. Blocking operators (join build side, grouping,
//!   sorting) buffer on that first poll.
//! - `Query` wraps a whole chain so it can be consumed any number of times.

pub mod aggregate;
pub mod filter;
pub mod group;
pub mod join;
pub mod project;
pub mod query;
pub mod sort;
pub mod traits;

pub use aggregate::Aggregation;
pub use filter::FieldPredicate;
pub use group::{group_by, group_by_with, group_tree, Group, GroupChildren, GroupNode, PriceBracket};
pub use join::{hash_join, intersect};
pub use query::Query;
pub use sort::{sorted, OrderBy, SortDirection};
pub use traits::{BoxIter, OpError};
