//! Store query grammar
//!
//! Typed rendition of the filter/aggregate/group-by request shapes the
//! [`DataStore`](super::DataStore) trait accepts. The engine builds these
//! from protocol `DataSource` requests; backends translate them into
//! whatever their driver speaks.

use super::value::{Row, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A single filter condition on a column.
///
/// Comparison and containment operators wrap their operand; plain equality
/// carries the value directly, matching the store filter grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Column equals the value
    Equals(Value),
    /// Column does not equal the value
    Not(Value),
    /// Column is greater than the value
    Gt(Value),
    /// Column is greater than or equal to the value
    Gte(Value),
    /// Column is less than the value
    Lt(Value),
    /// Column is less than or equal to the value
    Lte(Value),
    /// Column is one of the values (operand is expected to be an array)
    In(Value),
    /// Column contains the value (substring for strings, membership for arrays)
    Contains(Value),
}

impl Condition {
    /// Apply `f` to the inner operand, preserving the operator.
    pub fn map(self, f: impl FnOnce(Value) -> Value) -> Condition {
        match self {
            Condition::Equals(v) => Condition::Equals(f(v)),
            Condition::Not(v) => Condition::Not(f(v)),
            Condition::Gt(v) => Condition::Gt(f(v)),
            Condition::Gte(v) => Condition::Gte(f(v)),
            Condition::Lt(v) => Condition::Lt(f(v)),
            Condition::Lte(v) => Condition::Lte(f(v)),
            Condition::In(v) => Condition::In(f(v)),
            Condition::Contains(v) => Condition::Contains(f(v)),
        }
    }

    /// Borrow the inner operand.
    pub fn value(&self) -> &Value {
        match self {
            Condition::Equals(v)
            | Condition::Not(v)
            | Condition::Gt(v)
            | Condition::Gte(v)
            | Condition::Lt(v)
            | Condition::Lte(v)
            | Condition::In(v)
            | Condition::Contains(v) => v,
        }
    }

    /// Evaluate this condition against a column value (`None` = column absent).
    pub fn matches(&self, actual: Option<&Value>) -> bool {
        match self {
            Condition::Equals(expected) => actual == Some(expected),
            Condition::Not(expected) => actual != Some(expected),
            Condition::Gt(bound) => compare(actual, bound)
                .map(|o| o == Ordering::Greater)
                .unwrap_or(false),
            Condition::Gte(bound) => compare(actual, bound)
                .map(|o| o != Ordering::Less)
                .unwrap_or(false),
            Condition::Lt(bound) => compare(actual, bound)
                .map(|o| o == Ordering::Less)
                .unwrap_or(false),
            Condition::Lte(bound) => compare(actual, bound)
                .map(|o| o != Ordering::Greater)
                .unwrap_or(false),
            Condition::In(expected) => match (actual, expected) {
                (Some(actual), Value::Array(items)) => items.contains(actual),
                (Some(actual), other) => actual == other,
                (None, _) => false,
            },
            Condition::Contains(expected) => match (actual, expected) {
                (Some(Value::String(haystack)), Value::String(needle)) => {
                    haystack.contains(needle.as_str())
                }
                (Some(Value::Array(items)), needle) => items.contains(needle),
                _ => false,
            },
        }
    }
}

fn compare(actual: Option<&Value>, bound: &Value) -> Option<Ordering> {
    actual.and_then(|a| a.compare(bound))
}

/// A conjunction of per-column conditions.
pub type WhereClause = HashMap<String, Condition>;

/// Check a row against every condition in a where clause (AND semantics).
pub fn matches_clause(row: &Row, clause: &WhereClause) -> bool {
    clause
        .iter()
        .all(|(field, condition)| condition.matches(row.get(field)))
}

/// Sort direction for order directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Sort rows in place by a column, missing values first.
pub fn sort_rows(rows: &mut [Row], field: &str, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match (a.get(field), b.get(field)) {
            (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// A filtered/sorted/limited list-fetch request.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    /// Row filter
    pub filter: WhereClause,
    /// Order directive: column and direction
    pub order_by: Option<(String, SortDirection)>,
    /// Row cap
    pub take: Option<usize>,
    /// Columns to project; `None` fetches every column
    pub select: Option<Vec<String>>,
    /// Related data to attach, backend permitting
    pub include: Option<Vec<String>>,
}

impl FindQuery {
    /// Create a query with the given filter.
    pub fn new(filter: WhereClause) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Add an order directive.
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Cap the number of rows returned.
    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// Project only the named columns.
    pub fn select(mut self, columns: Vec<String>) -> Self {
        self.select = Some(columns);
        self
    }

    /// Attach the named relations.
    pub fn include(mut self, relations: Vec<String>) -> Self {
        self.include = Some(relations);
        self
    }
}

/// A per-measure aggregate directive.
///
/// `count` ignores the measured field and counts records, which is why it
/// carries no column.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateSpec {
    /// Total of a numeric column
    Sum(String),
    /// Mean of a numeric column
    Avg(String),
    /// Minimum of a column
    Min(String),
    /// Maximum of a column
    Max(String),
    /// Record count
    CountAll,
}

impl AggregateSpec {
    /// The measured column, if the measure has one.
    pub fn field(&self) -> Option<&str> {
        match self {
            AggregateSpec::Sum(f)
            | AggregateSpec::Avg(f)
            | AggregateSpec::Min(f)
            | AggregateSpec::Max(f) => Some(f),
            AggregateSpec::CountAll => None,
        }
    }
}

/// A native group-by request: group by a column, compute one aggregate per
/// group, optionally ordered by the aggregate measure and capped.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByQuery {
    /// Grouping column
    pub by: String,
    /// Row filter
    pub filter: WhereClause,
    /// Aggregate computed per group
    pub spec: AggregateSpec,
    /// Order directive keyed by the aggregate measure
    pub order_by: Option<SortDirection>,
    /// Row cap
    pub take: Option<usize>,
}

/// One group produced by a group-by request.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    /// Distinct value of the grouping column
    pub key: Value,
    /// Aggregate value for the group
    pub value: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_equals_matches() {
        let cond = Condition::Equals(Value::from("EXPENSE"));
        assert!(cond.matches(Some(&Value::from("EXPENSE"))));
        assert!(!cond.matches(Some(&Value::from("INCOME"))));
        assert!(!cond.matches(None));
    }

    #[test]
    fn test_not_matches_missing_column() {
        let cond = Condition::Not(Value::from("EXPENSE"));
        assert!(cond.matches(Some(&Value::from("INCOME"))));
        assert!(cond.matches(None));
        assert!(!cond.matches(Some(&Value::from("EXPENSE"))));
    }

    #[test]
    fn test_range_conditions() {
        assert!(Condition::Gt(Value::Number(100.0)).matches(Some(&Value::Number(150.0))));
        assert!(!Condition::Gt(Value::Number(100.0)).matches(Some(&Value::Number(100.0))));
        assert!(Condition::Gte(Value::Number(100.0)).matches(Some(&Value::Number(100.0))));
        assert!(Condition::Lt(Value::Number(100.0)).matches(Some(&Value::Number(99.0))));
        assert!(Condition::Lte(Value::Number(100.0)).matches(Some(&Value::Number(100.0))));
    }

    #[test]
    fn test_range_on_date_strings() {
        let cond = Condition::Gte(Value::from("2024-01-01T00:00:00.000Z"));
        assert!(cond.matches(Some(&Value::from("2024-02-01"))));
        assert!(!cond.matches(Some(&Value::from("2023-12-31"))));
    }

    #[test]
    fn test_in_condition() {
        let cond = Condition::In(Value::Array(vec![Value::from("a"), Value::from("b")]));
        assert!(cond.matches(Some(&Value::from("a"))));
        assert!(!cond.matches(Some(&Value::from("c"))));
    }

    #[test]
    fn test_contains_condition() {
        let cond = Condition::Contains(Value::from("gro"));
        assert!(cond.matches(Some(&Value::from("groceries"))));
        assert!(!cond.matches(Some(&Value::from("rent"))));
    }

    #[test]
    fn test_condition_map_preserves_operator() {
        let cond = Condition::Lt(Value::from("2024-02-01"));
        let mapped = cond.map(|v| match v {
            Value::String(s) => Value::String(format!("{s}!")),
            other => other,
        });
        assert_eq!(mapped, Condition::Lt(Value::from("2024-02-01!")));
    }

    #[test]
    fn test_matches_clause_and_semantics() {
        let r = row(&[
            ("amount", Value::Number(150.0)),
            ("type", Value::from("EXPENSE")),
        ]);
        let mut clause = WhereClause::new();
        clause.insert("amount".into(), Condition::Gt(Value::Number(100.0)));
        clause.insert("type".into(), Condition::Equals(Value::from("EXPENSE")));
        assert!(matches_clause(&r, &clause));

        clause.insert("type".into(), Condition::Equals(Value::from("INCOME")));
        assert!(!matches_clause(&r, &clause));
    }

    #[test]
    fn test_sort_rows_directions() {
        let mut rows = vec![
            row(&[("amount", Value::Number(200.0))]),
            row(&[("amount", Value::Number(50.0))]),
            row(&[("amount", Value::Number(100.0))]),
        ];
        sort_rows(&mut rows, "amount", SortDirection::Asc);
        assert_eq!(rows[0]["amount"], Value::Number(50.0));
        sort_rows(&mut rows, "amount", SortDirection::Desc);
        assert_eq!(rows[0]["amount"], Value::Number(200.0));
    }
}
