//! Data-store client boundary
//!
//! The engine depends only on the [`DataStore`] trait. Connection
//! management, pooling, transactions, retries, and timeouts all live behind
//! this seam; the engine performs none of them.

use super::query::{AggregateSpec, FindQuery, GroupByQuery, GroupRow, WhereClause};
use super::value::{Row, Value};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named model does not exist in the backend
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Backend-level failure (network, constraint, timeout)
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Asynchronous client for a relational store.
///
/// Implementations translate the typed query grammar into their driver's
/// wire format. All three operations are scoped to a model (table) name.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch rows matching a filter, optionally sorted, capped, projected,
    /// and joined with related data.
    async fn find_many(&self, model: &str, query: FindQuery) -> StoreResult<Vec<Row>>;

    /// Compute a whole-table aggregate over the rows matching the filter.
    ///
    /// Returns [`Value::Null`] when no rows match a field measure.
    async fn aggregate(
        &self,
        model: &str,
        filter: &WhereClause,
        spec: &AggregateSpec,
    ) -> StoreResult<Value>;

    /// Group matching rows by a column and compute one aggregate per group.
    async fn group_by(&self, model: &str, query: GroupByQuery) -> StoreResult<Vec<GroupRow>>;
}
