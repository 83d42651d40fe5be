//! # Dashsource
//!
//! Query Execution & Aggregation Engine - turns declarative dashboard
//! DataSource requests into access-scoped queries against a pluggable
//! relational store.
//!
//! ## Features
//!
//! - **Access scoping**: every query is structurally bound to a caller
//!   identity; caller filters can never widen it
//! - **Declarative protocol**: resources, filters, aggregations, sort, and
//!   limit as plain JSON-facing types
//! - **Aggregation planning**: native store aggregates and group-bys where
//!   possible, in-memory calendar bucketing (`year`, `month`, `day`,
//!   `week`, `quarter`) where not
//! - **Pluggable resolution**: indirect field references resolved through a
//!   deployment-supplied resolver
//! - **Uniform results**: aggregate and grouped output normalized into
//!   plain rows
//!
//! ## Modules
//!
//! - [`protocol`]: DataSource request types
//! - [`store`]: store client trait, query grammar, and in-memory backend
//! - [`engine`]: executor, configuration, conversion, and aggregation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dashsource::{
//!     Aggregation, AggregationType, DataSource, Executor, ExecutorConfig, MemoryStore,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!
//!     let config = ExecutorConfig::new()
//!         .resource("transactions", "transaction")
//!         .enum_mapping("type", "expense", "EXPENSE");
//!     let executor = Executor::new(store, config);
//!
//!     // Monthly spending totals, scoped to one user
//!     let source = DataSource::new("transactions")
//!         .aggregation(Aggregation::new(AggregationType::Sum, "amount").by("month"));
//!
//!     let rows = executor.execute(&source, "user-1").await?;
//!     println!("{} monthly buckets", rows.len());
//!
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod protocol;
pub mod store;

// Re-export top-level types for convenience
pub use protocol::{Aggregation, AggregationType, DataSource, Filter, FilterOperator, Sort};

pub use engine::{
    EngineError, EngineResult, Executor, ExecutorConfig, FieldResolver, ResolvedFilter,
    ResolverContext, ResultTransform, VirtualDateField,
};

pub use store::{
    AggregateSpec, Condition, DataStore, FindQuery, GroupByQuery, GroupRow, MemoryStore, Numeric,
    Row, SortDirection, StoreError, StoreResult, Value, WhereClause,
};
