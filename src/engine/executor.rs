//! DataSource executor
//!
//! Orchestrates execution of protocol [`DataSource`] requests against a
//! [`DataStore`]:
//!
//! 1. Resolve the resource to a store model
//! 2. Build the where clause, ownership condition first
//! 3. Per filter: field resolver, enum conversion, operator translation,
//!    date normalization
//! 4. Plain fetch, native aggregate/group-by, or virtual date aggregation
//! 5. Normalize aggregate output into uniform rows
//!
//! Every query is scoped to a caller identity; the ownership condition is
//! injected structurally and cannot be removed or overridden by
//! caller-supplied filters.

use super::aggregate::{aggregate_by_date, VirtualDateField};
use super::config::{ExecutorConfig, ResolverContext};
use super::convert::{convert_date_condition, convert_enum_value, convert_operator};
use super::error::{EngineError, EngineResult};
use crate::protocol::{Aggregation, AggregationType, DataSource, Sort};
use crate::store::{
    sort_rows, Condition, DataStore, FindQuery, GroupByQuery, Row, Value, WhereClause,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Executes DataSource queries against a configured store.
pub struct Executor {
    store: Arc<dyn DataStore>,
    config: ExecutorConfig,
}

impl Executor {
    /// Create an executor over a store client and configuration.
    pub fn new(store: Arc<dyn DataStore>, config: ExecutorConfig) -> Self {
        Self { store, config }
    }

    /// Execute a single DataSource, scoped to the given owner identity.
    pub async fn execute(&self, source: &DataSource, owner_id: &str) -> EngineResult<Vec<Row>> {
        let model = self
            .config
            .resource_models
            .get(&source.resource)
            .ok_or_else(|| EngineError::UnknownResource(source.resource.clone()))?
            .clone();

        tracing::debug!(
            resource = %source.resource,
            model = %model,
            filters = source.filters.len(),
            aggregated = source.aggregation.is_some(),
            "Executing DataSource"
        );

        let filter = self.build_where(source, &model, owner_id).await?;

        if let Some(aggregation) = &source.aggregation {
            return self
                .execute_aggregation(&model, filter, aggregation, source.sort.as_ref(), source.limit)
                .await;
        }

        let mut query = FindQuery::new(filter);
        if let Some(sort) = &source.sort {
            query = query.order_by(sort.field.clone(), sort.direction);
        }
        if let Some(limit) = source.limit {
            query = query.take(limit);
        }
        if let Some(relations) = self.config.model_includes.get(&model) {
            query = query.include(relations.clone());
        }

        let rows = self.store.find_many(&model, query).await?;
        match &self.config.result_transform {
            Some(transform) => Ok(transform(rows, &model)),
            None => Ok(rows),
        }
    }

    /// Execute several named DataSources sequentially, collecting results
    /// under the same names. Fail-fast: the first failure aborts the batch
    /// and no partial entry is returned for it.
    pub async fn execute_many(
        &self,
        sources: &HashMap<String, DataSource>,
        owner_id: &str,
    ) -> EngineResult<HashMap<String, Vec<Row>>> {
        let mut results = HashMap::with_capacity(sources.len());
        for (name, source) in sources {
            let rows = self.execute(source, owner_id).await?;
            results.insert(name.clone(), rows);
        }
        Ok(results)
    }

    /// Build the where clause: ownership first, then each filter folded in
    /// through the resolution/conversion pipeline.
    async fn build_where(
        &self,
        source: &DataSource,
        model: &str,
        owner_id: &str,
    ) -> EngineResult<WhereClause> {
        let owner_condition = Condition::Equals(Value::from(owner_id));
        let mut clause = WhereClause::new();
        clause.insert(self.config.owner_field.clone(), owner_condition.clone());

        for filter in &source.filters {
            let mut field = filter.field.clone();
            let mut value = filter.value.clone();

            if let Some(resolver) = &self.config.field_resolver {
                let context = ResolverContext {
                    owner_id,
                    store: self.store.as_ref(),
                    model,
                };
                match resolver.resolve(&field, &value, context).await? {
                    Some(resolved) => {
                        field = resolved.field;
                        value = resolved.value;
                    }
                    None => {
                        tracing::debug!(field = %filter.field, "Field resolver dropped filter");
                        continue;
                    }
                }
            }

            if field == self.config.owner_field {
                tracing::warn!(field = %field, "Ignoring caller filter on the ownership field");
                continue;
            }

            let value = convert_enum_value(&field, value, &self.config.enum_mappings);
            let condition = convert_operator(&filter.op, value);
            let condition = convert_date_condition(&field, condition, &self.config.date_fields);
            clause.insert(field, condition);
        }

        // Ownership scoping is structural; nothing above may have clobbered it
        clause.insert(self.config.owner_field.clone(), owner_condition);
        Ok(clause)
    }

    /// Plan and run an aggregation: native aggregate, native group-by, or
    /// virtual date bucketing.
    async fn execute_aggregation(
        &self,
        model: &str,
        filter: WhereClause,
        aggregation: &Aggregation,
        sort: Option<&Sort>,
        limit: Option<usize>,
    ) -> EngineResult<Vec<Row>> {
        let kind = AggregationType::parse(&aggregation.kind)
            .ok_or_else(|| EngineError::UnsupportedAggregation(aggregation.kind.clone()))?;
        let spec = kind.to_spec(&aggregation.field);
        let column = format!("{}_{}", aggregation.field, kind);

        let by = match &aggregation.by {
            Some(by) => by,
            None => {
                let value = self.store.aggregate(model, &filter, &spec).await?;
                let mut row = Row::new();
                row.insert(column, Value::Number(value.to_number()));
                return Ok(vec![row]);
            }
        };

        if let Some(bucket) = VirtualDateField::parse(by) {
            // The store cannot group by a calendar granularity: fetch the
            // date column and the measure raw, bucket in memory, and apply
            // sort and limit afterwards.
            let query = FindQuery::new(filter)
                .select(vec![self.config.date_column.clone(), aggregation.field.clone()]);
            let data = self.store.find_many(model, query).await?;

            let mut rows =
                aggregate_by_date(&data, kind, &aggregation.field, bucket, &self.config.date_column);
            if let Some(sort) = sort {
                let sort_field = if sort.field == column {
                    column.as_str()
                } else {
                    bucket.as_str()
                };
                sort_rows(&mut rows, sort_field, sort.direction);
            }
            if let Some(limit) = limit {
                rows.truncate(limit);
            }
            return Ok(rows);
        }

        // A dotted reference groups by the relation's foreign key column
        let group_column = match by.split_once('.') {
            Some((relation, _)) => format!("{relation}Id"),
            None => by.clone(),
        };

        let groups = self
            .store
            .group_by(
                model,
                GroupByQuery {
                    by: group_column,
                    filter,
                    spec,
                    order_by: sort.map(|s| s.direction),
                    take: limit,
                },
            )
            .await?;

        Ok(groups
            .into_iter()
            .map(|group| {
                let mut row = Row::new();
                row.insert(by.clone(), group.key);
                row.insert(column.clone(), Value::Number(group.value.to_number()));
                row
            })
            .collect())
    }
}
