//! Data-store abstraction
//!
//! Everything the engine needs from a relational store, behind one async
//! trait:
//!
//! - **Values**: the [`Value`] scalar type, the [`Numeric`] wrapper
//!   capability, and [`Row`] result maps
//! - **Query grammar**: typed [`Condition`]/[`WhereClause`] filters and the
//!   [`FindQuery`]/[`AggregateSpec`]/[`GroupByQuery`] request shapes
//! - **Client**: the [`DataStore`] trait and [`StoreError`]
//! - **Memory backend**: [`MemoryStore`], an in-process implementation

mod client;
mod memory;
mod query;
mod value;

pub use client::{DataStore, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use query::{
    matches_clause, sort_rows, AggregateSpec, Condition, FindQuery, GroupByQuery, GroupRow,
    SortDirection, WhereClause,
};
pub use value::{Numeric, Row, Value};
