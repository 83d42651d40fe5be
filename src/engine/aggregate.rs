//! Aggregation planning and virtual date bucketing
//!
//! Grouping by a calendar granularity (`year`, `month`, `day`, `week`,
//! `quarter`) cannot be pushed down to the store, so matching rows are
//! fetched raw and bucketed here. Bucket keys are strings chosen so that
//! plain lexicographic ordering is also chronological ordering, and output
//! rows always come back ascending by bucket key.

use crate::protocol::AggregationType;
use crate::store::{AggregateSpec, Row, Value};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

impl AggregationType {
    /// Compute this aggregate over a group of values.
    ///
    /// `count` ignores the values and returns cardinality; `avg` of an
    /// empty group is 0, not NaN.
    pub fn apply(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            Self::Sum => values.iter().sum(),
            Self::Avg => values.iter().sum::<f64>() / values.len() as f64,
            Self::Count => values.len() as f64,
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }

    /// Build the store aggregate directive for this type over a field.
    pub fn to_spec(&self, field: &str) -> AggregateSpec {
        match self {
            Self::Sum => AggregateSpec::Sum(field.to_string()),
            Self::Avg => AggregateSpec::Avg(field.to_string()),
            Self::Min => AggregateSpec::Min(field.to_string()),
            Self::Max => AggregateSpec::Max(field.to_string()),
            Self::Count => AggregateSpec::CountAll,
        }
    }
}

/// Check an aggregation type string against the five recognized values.
pub fn validate_aggregation_type(raw: &str) -> bool {
    AggregationType::parse(raw).is_some()
}

/// Calendar granularities with no native column, computed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualDateField {
    /// `"YYYY"`
    Year,
    /// `"YYYY-MM"`
    Month,
    /// `"YYYY-MM-DD"`
    Day,
    /// `"YYYY-Wnn"`
    Week,
    /// `"YYYY-Qn"`
    Quarter,
}

impl VirtualDateField {
    /// Parse a grouping key string into a virtual date field.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "year" => Some(Self::Year),
            "month" => Some(Self::Month),
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "quarter" => Some(Self::Quarter),
            _ => None,
        }
    }

    /// The protocol name of this granularity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Week => "week",
            Self::Quarter => "quarter",
        }
    }
}

impl fmt::Display for VirtualDateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if the grouping key names a virtual date field rather than a
/// concrete column.
pub fn is_virtual_date_field(field: &str) -> bool {
    VirtualDateField::parse(field).is_some()
}

/// Compute the bucket key for a timestamp at the given granularity.
///
/// The `week` number is a simplified day-of-year count offset by the
/// weekday of January 1st, not ISO-8601 week numbering; callers depend on
/// this exact behavior, imperfect year boundaries included.
pub fn bucket_key(timestamp: &DateTime<Utc>, bucket: VirtualDateField) -> String {
    let year = timestamp.year();
    let month = timestamp.month();

    match bucket {
        VirtualDateField::Year => format!("{year}"),
        VirtualDateField::Month => format!("{year}-{month:02}"),
        VirtualDateField::Day => format!("{year}-{month:02}-{:02}", timestamp.day()),
        VirtualDateField::Quarter => format!("{year}-Q{}", (month + 2) / 3),
        VirtualDateField::Week => {
            let jan_first = match NaiveDate::from_yo_opt(year, 1) {
                Some(d) => d,
                None => return format!("{year}-W01"),
            };
            let elapsed = timestamp.naive_utc() - jan_first.and_time(NaiveTime::MIN);
            let past_days = elapsed.num_milliseconds() as f64 / 86_400_000.0;
            let first_weekday = jan_first.weekday().num_days_from_sunday() as f64;
            let week = ((past_days + first_weekday + 1.0) / 7.0).ceil() as i64;
            format!("{year}-W{week:02}")
        }
    }
}

/// Bucket rows by a calendar granularity and aggregate a numeric field per
/// bucket.
///
/// Rows whose date column is missing or unparseable are skipped; missing or
/// non-numeric measure values count as 0. Output rows are shaped
/// `{ "<bucket>": key, "<field>_<type>": value }` and sorted ascending by
/// bucket key.
pub fn aggregate_by_date(
    rows: &[Row],
    kind: AggregationType,
    field: &str,
    bucket: VirtualDateField,
    date_column: &str,
) -> Vec<Row> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for row in rows {
        let timestamp = match row.get(date_column).and_then(Value::as_datetime) {
            Some(ts) => ts,
            None => {
                tracing::warn!(column = %date_column, "Skipping row without a parseable date");
                continue;
            }
        };
        let key = bucket_key(&timestamp, bucket);
        let measure = row.get(field).map(Value::to_number).unwrap_or(0.0);
        groups.entry(key).or_default().push(measure);
    }

    let column = format!("{field}_{kind}");
    groups
        .into_iter()
        .map(|(key, values)| {
            let mut row = Row::new();
            row.insert(bucket.as_str().to_string(), Value::String(key));
            row.insert(column.clone(), Value::Number(kind.apply(&values)));
            row
        })
        .collect()
}
