//! Executor configuration
//!
//! Application-specific knowledge (resource names, enum vocabularies, date
//! columns, relational field resolution, result shaping) is supplied here
//! once at construction time. The executor never mutates its configuration.

use super::error::EngineResult;
use crate::store::{DataStore, Row, Value};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A filter rewritten by a [`FieldResolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    /// Concrete column to filter on
    pub field: String,
    /// Value to compare against
    pub value: Value,
}

impl ResolvedFilter {
    /// Create a resolved filter.
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Context handed to a field resolver for each filter.
pub struct ResolverContext<'a> {
    /// Identity the request is scoped to
    pub owner_id: &'a str,
    /// Store client, for lookups the resolution may need
    pub store: &'a dyn DataStore,
    /// Resolved model name for the current resource
    pub model: &'a str,
}

/// Pluggable resolution of indirect field references.
///
/// Deployments implement this to turn references like `category.name` into
/// a concrete column and value (`categoryId` = looked-up id). Returning
/// `Ok(None)` drops the filter silently; the other filters are unaffected.
#[async_trait]
pub trait FieldResolver: Send + Sync {
    /// Resolve one filter's field and value, or drop it.
    async fn resolve(
        &self,
        field: &str,
        value: &Value,
        context: ResolverContext<'_>,
    ) -> EngineResult<Option<ResolvedFilter>>;
}

/// Post-transform applied to plain (non-aggregate) query results.
pub type ResultTransform = dyn Fn(Vec<Row>, &str) -> Vec<Row> + Send + Sync;

const DEFAULT_OWNER_FIELD: &str = "userId";
const DEFAULT_DATE_COLUMN: &str = "date";

/// Immutable executor configuration, built once with the chained setters.
#[derive(Clone)]
pub struct ExecutorConfig {
    pub(crate) resource_models: HashMap<String, String>,
    pub(crate) owner_field: String,
    pub(crate) enum_mappings: HashMap<String, HashMap<String, Value>>,
    pub(crate) date_fields: Vec<String>,
    pub(crate) date_column: String,
    pub(crate) field_resolver: Option<Arc<dyn FieldResolver>>,
    pub(crate) model_includes: HashMap<String, Vec<String>>,
    pub(crate) result_transform: Option<Arc<ResultTransform>>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorConfig {
    /// Create a configuration with built-in defaults and no resources.
    pub fn new() -> Self {
        Self {
            resource_models: HashMap::new(),
            owner_field: DEFAULT_OWNER_FIELD.to_string(),
            enum_mappings: HashMap::new(),
            date_fields: vec![
                "date".to_string(),
                "createdAt".to_string(),
                "updatedAt".to_string(),
                "month".to_string(),
            ],
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            field_resolver: None,
            model_includes: HashMap::new(),
            result_transform: None,
        }
    }

    /// Map a protocol resource name to a store model name.
    pub fn resource(mut self, resource: impl Into<String>, model: impl Into<String>) -> Self {
        self.resource_models.insert(resource.into(), model.into());
        self
    }

    /// Column every query is scoped to (default `userId`).
    pub fn owner_field(mut self, field: impl Into<String>) -> Self {
        self.owner_field = field.into();
        self
    }

    /// Map a protocol enum value to the store's vocabulary for a field.
    pub fn enum_mapping(
        mut self,
        field: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<Value>,
    ) -> Self {
        self.enum_mappings
            .entry(field.into())
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    /// Replace the list of date-typed fields (default
    /// `date`, `createdAt`, `updatedAt`, `month`).
    pub fn date_fields(mut self, fields: Vec<String>) -> Self {
        self.date_fields = fields;
        self
    }

    /// Mark an additional field as date-typed.
    pub fn date_field(mut self, field: impl Into<String>) -> Self {
        self.date_fields.push(field.into());
        self
    }

    /// Column holding the timestamp used for virtual date bucketing
    /// (default `date`).
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = column.into();
        self
    }

    /// Install a field resolver for indirect references.
    pub fn field_resolver(mut self, resolver: Arc<dyn FieldResolver>) -> Self {
        self.field_resolver = Some(resolver);
        self
    }

    /// Attach a relation whenever the given model is fetched.
    pub fn include(mut self, model: impl Into<String>, relation: impl Into<String>) -> Self {
        self.model_includes
            .entry(model.into())
            .or_default()
            .push(relation.into());
        self
    }

    /// Install a post-transform for plain query results.
    pub fn result_transform(
        mut self,
        transform: impl Fn(Vec<Row>, &str) -> Vec<Row> + Send + Sync + 'static,
    ) -> Self {
        self.result_transform = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for ExecutorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorConfig")
            .field("resource_models", &self.resource_models)
            .field("owner_field", &self.owner_field)
            .field("enum_mappings", &self.enum_mappings)
            .field("date_fields", &self.date_fields)
            .field("date_column", &self.date_column)
            .field("field_resolver", &self.field_resolver.is_some())
            .field("model_includes", &self.model_includes)
            .field("result_transform", &self.result_transform.is_some())
            .finish()
    }
}
