//! Engine error types
//!
//! The taxonomy is deliberately small: unknown resources and unsupported
//! aggregation types are hard failures, store failures propagate unchanged,
//! and the two permissive cases (unrecognized operators, resolver-dropped
//! filters) never surface here at all.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur while executing a DataSource.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Resource not present in the configured resource-to-model map
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Aggregation type outside the five recognized values
    #[error("Unsupported aggregation type: \"{0}\". Valid types are: sum, avg, count, min, max")]
    UnsupportedAggregation(String),

    /// A configured field resolver failed
    #[error("Field resolver failed for \"{field}\": {message}")]
    Resolver {
        /// Field the resolver was asked about
        field: String,
        /// What went wrong
        message: String,
    },

    /// Store-level failure, propagated unchanged
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
