//! Scalar values exchanged with the data store
//!
//! Every row cell, filter value, and aggregate result in the engine is a
//! [`Value`]. Store backends that surface opaque numeric wrapper types
//! (fixed-point decimals, bignums) implement the [`Numeric`] capability
//! trait instead of relying on ad hoc accessor probing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single result row: an open map of column name to value.
///
/// Rows carry no identity beyond their content; they are created fresh per
/// execution and have no lifecycle past the request that produced them.
pub type Row = HashMap<String, Value>;

/// Capability trait for store-specific numeric wrapper types.
///
/// Backends whose drivers return decimals as opaque objects wrap them in
/// [`Value::Numeric`]; the engine unwraps them through this trait when
/// normalizing aggregate results.
pub trait Numeric: fmt::Debug + Send + Sync {
    /// The plain floating-point rendition of this value.
    fn to_f64(&self) -> f64;
}

/// A scalar (or array-of-scalar) value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent / null
    Null,
    /// Boolean
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
    /// Timestamp (stores that type their date columns return this)
    DateTime(DateTime<Utc>),
    /// Array of values (used by `in` filters)
    Array(Vec<Value>),
    /// Opaque numeric wrapper from the store driver
    Numeric(Arc<dyn Numeric>),
}

impl Value {
    /// Coerce this value to a plain number.
    ///
    /// Numbers pass through, numeric strings parse, [`Numeric`] wrappers
    /// unwrap, booleans map to 1/0, timestamps to epoch milliseconds.
    /// Anything unparseable becomes 0, never NaN, so downstream arithmetic
    /// stays total.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Value::Numeric(n) => n.to_f64(),
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::DateTime(dt) => dt.timestamp_millis() as f64,
            Value::Null | Value::Array(_) => 0.0,
        }
    }

    /// Interpret this value as a UTC timestamp, if possible.
    ///
    /// Accepts typed timestamps, RFC 3339 strings, timezone-less datetime
    /// strings (assumed UTC), and bare `YYYY-MM-DD` dates (midnight UTC).
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::String(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Compare two values, where comparable.
    ///
    /// Numbers (and numeric wrappers) compare numerically, strings
    /// lexicographically, timestamps chronologically. A timestamp compared
    /// against a date string parses the string first. Mixed shapes are
    /// incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(_) | Value::Numeric(_), Value::Number(_) | Value::Numeric(_)) => {
                self.to_number().partial_cmp(&other.to_number())
            }
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::String(_)) => {
                other.as_datetime().map(|b| a.cmp(&b))
            }
            (Value::String(_), Value::DateTime(b)) => {
                self.as_datetime().map(|a| a.cmp(b))
            }
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Parse a datetime from the string shapes the protocol produces.
pub(crate) fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }
    None
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Numeric(a), Value::Numeric(b)) => a.to_f64() == b.to_f64(),
            (Value::Numeric(a), Value::Number(b)) | (Value::Number(b), Value::Numeric(a)) => {
                a.to_f64() == *b
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::DateTime(dt) => {
                write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", rendered.join(","))
            }
            Value::Numeric(n) => write!(f, "{}", n.to_f64()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                // Whole numbers serialize as integers for clean JSON output
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 9.007_199_254_740_992e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Value::Array(items) => items.serialize(serializer),
            Value::Numeric(n) => serializer.serialize_f64(n.to_f64()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a scalar or an array of scalars")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Number(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                Ok(Value::Number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Array(items))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(v as f64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}
