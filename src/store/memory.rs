//! In-memory data store
//!
//! A small, fully functional [`DataStore`] backend over in-process tables.
//! Useful as a test double with real semantics and as a default backend for
//! demos. Relations are not modeled, so `include` directives are accepted
//! and ignored.

use super::client::{DataStore, StoreError, StoreResult};
use super::query::{
    matches_clause, sort_rows, AggregateSpec, FindQuery, GroupByQuery, GroupRow, WhereClause,
};
use super::value::{Row, Value};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// In-process table store keyed by model name.
#[derive(Default)]
pub struct MemoryStore {
    models: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single row, creating the model if needed.
    pub async fn insert(&self, model: &str, row: Row) {
        let mut models = self.models.write().await;
        models.entry(model.to_string()).or_default().push(row);
    }

    /// Insert a batch of rows, creating the model if needed.
    ///
    /// Registering a model with an empty batch is valid and makes later
    /// queries against it return no rows instead of failing.
    pub async fn insert_many(&self, model: &str, rows: Vec<Row>) {
        let mut models = self.models.write().await;
        models.entry(model.to_string()).or_default().extend(rows);
    }

    async fn matching(&self, model: &str, filter: &WhereClause) -> StoreResult<Vec<Row>> {
        let models = self.models.read().await;
        let rows = models
            .get(model)
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
        Ok(rows
            .iter()
            .filter(|row| matches_clause(row, filter))
            .cloned()
            .collect())
    }
}

/// Compute an aggregate directive over a set of rows.
///
/// Field measures skip rows where the column is absent or null, matching
/// how relational aggregates treat nulls; an empty input yields
/// [`Value::Null`] rather than 0 so callers can tell "no rows" apart from
/// "sums to zero".
fn apply_spec(spec: &AggregateSpec, rows: &[Row]) -> Value {
    if let AggregateSpec::CountAll = spec {
        return Value::Number(rows.len() as f64);
    }

    let field = spec.field().unwrap_or_default();
    let values: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.get(field))
        .filter(|value| !value.is_null())
        .map(Value::to_number)
        .collect();

    if values.is_empty() {
        return Value::Null;
    }

    let result = match spec {
        AggregateSpec::Sum(_) => values.iter().sum(),
        AggregateSpec::Avg(_) => values.iter().sum::<f64>() / values.len() as f64,
        AggregateSpec::Min(_) => values.iter().copied().fold(f64::INFINITY, f64::min),
        AggregateSpec::Max(_) => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        AggregateSpec::CountAll => unreachable!(),
    };
    Value::Number(result)
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn find_many(&self, model: &str, query: FindQuery) -> StoreResult<Vec<Row>> {
        let mut rows = self.matching(model, &query.filter).await?;

        if let Some((field, direction)) = &query.order_by {
            sort_rows(&mut rows, field, *direction);
        }
        if let Some(n) = query.take {
            rows.truncate(n);
        }
        if let Some(columns) = &query.select {
            rows = rows
                .into_iter()
                .map(|mut row| {
                    row.retain(|column, _| columns.iter().any(|c| c == column));
                    row
                })
                .collect();
        }

        Ok(rows)
    }

    async fn aggregate(
        &self,
        model: &str,
        filter: &WhereClause,
        spec: &AggregateSpec,
    ) -> StoreResult<Value> {
        let rows = self.matching(model, filter).await?;
        Ok(apply_spec(spec, &rows))
    }

    async fn group_by(&self, model: &str, query: GroupByQuery) -> StoreResult<Vec<GroupRow>> {
        let rows = self.matching(model, &query.filter).await?;

        // Keyed by the rendered group value for deterministic iteration
        let mut groups: BTreeMap<String, (Value, Vec<Row>)> = BTreeMap::new();
        for row in rows {
            let key = row.get(&query.by).cloned().unwrap_or(Value::Null);
            groups
                .entry(key.to_string())
                .or_insert_with(|| (key, Vec::new()))
                .1
                .push(row);
        }

        let mut out: Vec<GroupRow> = groups
            .into_values()
            .map(|(key, members)| GroupRow {
                value: apply_spec(&query.spec, &members),
                key,
            })
            .collect();

        if let Some(direction) = query.order_by {
            out.sort_by(|a, b| {
                let ordering = a
                    .value
                    .to_number()
                    .partial_cmp(&b.value.to_number())
                    .unwrap_or(std::cmp::Ordering::Equal);
                match direction {
                    super::query::SortDirection::Asc => ordering,
                    super::query::SortDirection::Desc => ordering.reverse(),
                }
            });
        }
        if let Some(n) = query.take {
            out.truncate(n);
        }

        Ok(out)
    }
}
