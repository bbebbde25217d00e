//! Runtime values

use crate::ResultKind;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

/// A runtime value produced by the generic (object) entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent value
    Null,
    Boolean(bool),
    Int32(i32),
    /// IEEE-754 double; NaN is the "no data" sentinel
    Float64(f64),
    /// Fixed-point decimal
    Decimal(Decimal),
    String(String),
    DateTime(NaiveDateTime),
    /// Opaque value carried through unchanged
    Object(JsonValue),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, or the floating point NaN sentinel
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float64(f) => f.is_nan(),
            _ => false,
        }
    }

    /// The kind of this value; `None` for null
    pub fn kind(&self) -> Option<ResultKind> {
        match self {
            Self::Null => None,
            Self::Boolean(_) => Some(ResultKind::Boolean),
            Self::Int32(_) => Some(ResultKind::Int32),
            Self::Float64(_) => Some(ResultKind::Float64),
            Self::Decimal(_) => Some(ResultKind::Decimal),
            Self::String(_) => Some(ResultKind::String),
            Self::DateTime(_) => Some(ResultKind::DateTime),
            Self::Object(_) => Some(ResultKind::Object),
        }
    }

    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Wrap a float, turning NaN into null
    pub fn from_f64_or_null(value: f64) -> Self {
        if value.is_nan() { Self::Null } else { Self::Float64(value) }
    }

    /// Compare two values using the native ordering of their kinds.
    ///
    /// Numeric kinds compare across each other (Int32 and Decimal exactly,
    /// anything involving Float64 as floats). Returns `None` when either side
    /// is null, NaN, an opaque object, or the kinds are unrelated.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Int32(a), Self::Int32(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Int32(a), Self::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (Self::Decimal(a), Self::Int32(b)) => Some(a.cmp(&Decimal::from(*b))),
            (Self::Float64(a), Self::Float64(b)) => a.partial_cmp(b),
            (Self::Float64(a), Self::Int32(b)) => a.partial_cmp(&f64::from(*b)),
            (Self::Int32(a), Self::Float64(b)) => f64::from(*a).partial_cmp(b),
            (Self::Float64(a), Self::Decimal(b)) => a.partial_cmp(&b.to_f64()?),
            (Self::Decimal(a), Self::Float64(b)) => a.to_f64()?.partial_cmp(b),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Int32(i) => write!(f, "{}", i),
            Self::Float64(d) => write!(f, "{}", d),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::String(s) => write!(f, "'{}'", s),
            Self::DateTime(dt) => write!(f, "@{}", dt.format(crate::coercion::DATETIME_FORMAT)),
            Self::Object(o) => write!(f, "{}", o),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_compare_across_numeric_kinds() {
        let d = Value::Decimal(Decimal::from_str("7.5").unwrap());
        assert_eq!(Value::Int32(7).compare(&d), Some(Ordering::Less));
        assert_eq!(d.compare(&Value::Float64(7.5)), Some(Ordering::Equal));
        assert_eq!(Value::Float64(f64::NAN).compare(&Value::Float64(1.0)), None);
    }

    #[test]
    fn test_compare_unrelated_kinds() {
        assert_eq!(Value::Int32(1).compare(&Value::string("1")), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
    }

    #[test]
    fn test_absent() {
        assert!(Value::Null.is_absent());
        assert!(Value::Float64(f64::NAN).is_absent());
        assert!(!Value::Float64(0.0).is_absent());
        assert_eq!(Value::from_f64_or_null(f64::NAN), Value::Null);
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }
}
