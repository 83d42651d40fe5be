//! Dashboard-schema protocol types
//!
//! The inbound request vocabulary: [`DataSource`] and its parts. Generated
//! view schemas carry these as JSON; the engine consumes them as-is.

mod datasource;

pub use datasource::{
    Aggregation, AggregationType, DataSource, Filter, FilterOperator, Sort,
};
