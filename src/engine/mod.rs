//! Query execution engine
//!
//! Turns protocol [`DataSource`](crate::protocol::DataSource) requests into
//! access-scoped store queries, plans aggregations (native where the store
//! can, in-memory date bucketing where it cannot), and normalizes the
//! results into uniform rows.

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod error;
pub mod executor;

pub use aggregate::{
    aggregate_by_date, bucket_key, is_virtual_date_field, validate_aggregation_type,
    VirtualDateField,
};
pub use config::{
    ExecutorConfig, FieldResolver, ResolvedFilter, ResolverContext, ResultTransform,
};
pub use convert::{
    convert_date_condition, convert_enum_value, convert_operator, normalize_date,
};
pub use error::{EngineError, EngineResult};
pub use executor::Executor;
