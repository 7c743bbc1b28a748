//! Live database schema snapshot
//!
//! Table and column descriptors consumed by the query builder and the
//! validators. Introspection (how descriptors get built from a real
//! database) and refresh live outside this crate; everything here is
//! read-only once registered.

pub mod column;

mod cache;
mod types;

pub use cache::SchemaCache;
pub use types::{ColumnDescriptor, ColumnType, TableDescriptor};
