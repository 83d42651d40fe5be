//! DataSource protocol types
//!
//! The declarative data-request shape consumed from the dashboard-schema
//! protocol. These types are JSON-facing and version independent: foreign
//! operator strings and aggregation types survive deserialization and are
//! handled (permissively or as hard failures, respectively) at execution
//! time rather than at the parse boundary.

use crate::store::{SortDirection, Value};
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One declarative data request: a resource plus optional filters,
/// aggregation, sort, and limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    /// Logical resource name, mapped to a store model via configuration
    pub resource: String,
    /// Filter conditions (AND semantics)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Aggregate to compute instead of returning raw rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
    /// Sort directive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
    /// Result cap
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl DataSource {
    /// Start a request against a resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            filters: Vec::new(),
            aggregation: None,
            sort: None,
            limit: None,
        }
    }

    /// Add a filter condition.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Request an aggregate instead of raw rows.
    pub fn aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    /// Sort the result.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    /// Cap the result.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Field to filter on (may be an indirect reference for a resolver)
    pub field: String,
    /// Comparison operator
    pub op: FilterOperator,
    /// Comparison value
    pub value: Value,
}

impl Filter {
    /// Create a filter.
    pub fn new(
        field: impl Into<String>,
        op: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// Filter comparison operators.
///
/// Operator strings outside the recognized set deserialize into
/// [`FilterOperator::Unknown`]; the engine treats those as equality
/// pass-through rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal
    Eq,
    /// Not equal
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// In array
    In,
    /// Partial match
    Contains,
    /// Unrecognized operator, carried verbatim
    Unknown(String),
}

impl FilterOperator {
    /// Parse an operator string. Never fails; foreign strings become
    /// [`FilterOperator::Unknown`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "eq" => Self::Eq,
            "neq" => Self::Neq,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "in" => Self::In,
            "contains" => Self::Contains,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The protocol string for this operator.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OperatorVisitor;

        impl de::Visitor<'_> for OperatorVisitor {
            type Value = FilterOperator;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a filter operator string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FilterOperator, E> {
                Ok(FilterOperator::parse(v))
            }
        }

        deserializer.deserialize_str(OperatorVisitor)
    }
}

/// The five recognized aggregation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    /// Total
    Sum,
    /// Mean
    Avg,
    /// Group cardinality
    Count,
    /// Minimum
    Min,
    /// Maximum
    Max,
}

impl AggregationType {
    /// Parse an aggregation type string. Case sensitive: the protocol
    /// speaks lowercase.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "sum" => Some(Self::Sum),
            "avg" => Some(Self::Avg),
            "count" => Some(Self::Count),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// The protocol string for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
            Self::Count => "count",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An aggregation request.
///
/// The type is carried as a raw string so that an unrecognized value fails
/// at execution time with the offending name instead of at the parse
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    /// Aggregation type string (`sum`, `avg`, `count`, `min`, `max`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Field the aggregate measures
    pub field: String,
    /// Grouping key: a concrete column or a virtual date field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
}

impl Aggregation {
    /// Create a typed aggregation.
    pub fn new(kind: AggregationType, field: impl Into<String>) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            field: field.into(),
            by: None,
        }
    }

    /// Create an aggregation from a raw type string (validated at
    /// execution time).
    pub fn raw(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            field: field.into(),
            by: None,
        }
    }

    /// Group the aggregate by a column or virtual date field.
    pub fn by(mut self, column: impl Into<String>) -> Self {
        self.by = Some(column.into());
        self
    }
}

/// A sort directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Column (or aggregate output column) to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl Sort {
    /// Create a sort directive.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}
