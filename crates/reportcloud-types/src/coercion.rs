//! Coercion rules between result kinds
//!
//! Every typed evaluation entry point ends in one of these conversions when
//! the node's native kind differs from the requested kind. The rules are
//! explicit and limited:
//!
//! - numeric kinds convert between each other; Float64/Decimal to Int32
//!   rounds half to even and fails when out of range
//! - every kind except Object has a canonical text form
//! - text parses into the other kinds, failing on malformed input
//! - DateTime only converts to and from text
//! - null and NaN map to the absent representation of the target kind

use crate::{ResultKind, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value as JsonValue;
use std::num::IntErrorKind;
use std::str::FromStr;
use thiserror::Error;

/// Canonical text form of DateTime values
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Coercion errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// No conversion is defined between the kinds
    #[error("Cannot convert {from} to {to}")]
    CannotConvert { from: String, to: String },

    /// Text could not be parsed as the target kind
    #[error("'{text}' is not a valid {to}")]
    InvalidFormat { text: String, to: String },

    /// The value does not fit the target kind
    #[error("Value {value} is out of range for {to}")]
    Overflow { value: String, to: String },
}

impl CoercionError {
    /// Create a cannot-convert error
    pub fn cannot_convert(from: impl Into<String>, to: ResultKind) -> Self {
        Self::CannotConvert {
            from: from.into(),
            to: to.name().to_string(),
        }
    }

    /// Create an invalid format error
    pub fn invalid_format(text: impl Into<String>, to: ResultKind) -> Self {
        Self::InvalidFormat {
            text: text.into(),
            to: to.name().to_string(),
        }
    }

    /// Create an overflow error
    pub fn overflow(value: impl ToString, to: ResultKind) -> Self {
        Self::Overflow {
            value: value.to_string(),
            to: to.name().to_string(),
        }
    }
}

/// Coercion result
pub type CoercionResult<T> = Result<T, CoercionError>;

// ============================================================================
// Absent representations
// ============================================================================

pub const ABSENT_BOOLEAN: bool = false;
pub const ABSENT_INT32: i32 = i32::MIN;
pub const ABSENT_FLOAT64: f64 = f64::NAN;
pub const ABSENT_DECIMAL: Decimal = Decimal::MIN;
pub const ABSENT_DATETIME: NaiveDateTime = NaiveDateTime::MIN;

// ============================================================================
// Scalar conversions
// ============================================================================

pub fn boolean_to_int32(value: bool) -> i32 {
    i32::from(value)
}

pub fn boolean_to_float64(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

pub fn boolean_to_decimal(value: bool) -> Decimal {
    if value { Decimal::ONE } else { Decimal::ZERO }
}

pub fn boolean_to_text(value: bool) -> String {
    value.to_string()
}

pub fn int32_to_boolean(value: i32) -> bool {
    value != 0
}

pub fn int32_to_float64(value: i32) -> f64 {
    f64::from(value)
}

pub fn int32_to_decimal(value: i32) -> Decimal {
    Decimal::from(value)
}

pub fn int32_to_text(value: i32) -> String {
    value.to_string()
}

/// NaN maps to `false`; any other non-zero value is `true`
pub fn float64_to_boolean(value: f64) -> bool {
    !value.is_nan() && value != 0.0
}

/// Round half to even. NaN maps to the absent Int32.
pub fn float64_to_int32(value: f64) -> CoercionResult<i32> {
    if value.is_nan() {
        return Ok(ABSENT_INT32);
    }
    let rounded = value.round_ties_even();
    if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return Err(CoercionError::overflow(value, ResultKind::Int32));
    }
    Ok(rounded as i32)
}

/// NaN maps to the absent Decimal; infinities do not fit.
pub fn float64_to_decimal(value: f64) -> CoercionResult<Decimal> {
    if value.is_nan() {
        return Ok(ABSENT_DECIMAL);
    }
    Decimal::from_f64(value).ok_or_else(|| CoercionError::overflow(value, ResultKind::Decimal))
}

/// NaN maps to the empty string
pub fn float64_to_text(value: f64) -> String {
    if value.is_nan() { String::new() } else { value.to_string() }
}

pub fn decimal_to_boolean(value: Decimal) -> bool {
    !value.is_zero()
}

/// Round half to even
pub fn decimal_to_int32(value: Decimal) -> CoercionResult<i32> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_i32()
        .ok_or_else(|| CoercionError::overflow(value, ResultKind::Int32))
}

pub fn decimal_to_float64(value: Decimal) -> CoercionResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| CoercionError::overflow(value, ResultKind::Float64))
}

pub fn decimal_to_text(value: Decimal) -> String {
    value.to_string()
}

pub fn datetime_to_text(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

// ============================================================================
// Text parsing
// ============================================================================

/// Accepts `true`/`false` in any case
pub fn parse_boolean(text: &str) -> CoercionResult<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(CoercionError::invalid_format(text, ResultKind::Boolean))
    }
}

pub fn parse_int32(text: &str) -> CoercionResult<i32> {
    text.trim().parse::<i32>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            CoercionError::overflow(text, ResultKind::Int32)
        }
        _ => CoercionError::invalid_format(text, ResultKind::Int32),
    })
}

pub fn parse_float64(text: &str) -> CoercionResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| CoercionError::invalid_format(text, ResultKind::Float64))
}

/// Plain or scientific notation
pub fn parse_decimal(text: &str) -> CoercionResult<Decimal> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| CoercionError::invalid_format(text, ResultKind::Decimal))
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, `YYYY-MM-DD HH:MM:SS[.fff]`
/// and a bare `YYYY-MM-DD` (midnight).
pub fn parse_datetime(text: &str) -> CoercionResult<NaiveDateTime> {
    let trimmed = text.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }
    for format in [DATETIME_FORMAT, "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| CoercionError::invalid_format(text, ResultKind::DateTime))
}

// ============================================================================
// Value conversions
// ============================================================================

impl Value {
    fn kind_name(&self) -> &'static str {
        self.kind().map_or("Null", |k| k.name())
    }

    /// Convert to Boolean
    pub fn to_boolean(&self) -> CoercionResult<bool> {
        match self {
            Value::Null => Ok(ABSENT_BOOLEAN),
            Value::Boolean(b) => Ok(*b),
            Value::Int32(i) => Ok(int32_to_boolean(*i)),
            Value::Float64(f) => Ok(float64_to_boolean(*f)),
            Value::Decimal(d) => Ok(decimal_to_boolean(*d)),
            Value::String(s) => parse_boolean(s),
            Value::DateTime(_) => Err(CoercionError::cannot_convert(self.kind_name(), ResultKind::Boolean)),
            Value::Object(json) => json_scalar(json, ResultKind::Boolean)?.to_boolean(),
        }
    }

    /// Convert to Int32
    pub fn to_int32(&self) -> CoercionResult<i32> {
        match self {
            Value::Null => Ok(ABSENT_INT32),
            Value::Boolean(b) => Ok(boolean_to_int32(*b)),
            Value::Int32(i) => Ok(*i),
            Value::Float64(f) => float64_to_int32(*f),
            Value::Decimal(d) => decimal_to_int32(*d),
            Value::String(s) => parse_int32(s),
            Value::DateTime(_) => Err(CoercionError::cannot_convert(self.kind_name(), ResultKind::Int32)),
            Value::Object(json) => json_scalar(json, ResultKind::Int32)?.to_int32(),
        }
    }

    /// Convert to Float64
    pub fn to_float64(&self) -> CoercionResult<f64> {
        match self {
            Value::Null => Ok(ABSENT_FLOAT64),
            Value::Boolean(b) => Ok(boolean_to_float64(*b)),
            Value::Int32(i) => Ok(int32_to_float64(*i)),
            Value::Float64(f) => Ok(*f),
            Value::Decimal(d) => decimal_to_float64(*d),
            Value::String(s) => parse_float64(s),
            Value::DateTime(_) => Err(CoercionError::cannot_convert(self.kind_name(), ResultKind::Float64)),
            Value::Object(json) => json_scalar(json, ResultKind::Float64)?.to_float64(),
        }
    }

    /// Convert to Decimal
    pub fn to_decimal(&self) -> CoercionResult<Decimal> {
        match self {
            Value::Null => Ok(ABSENT_DECIMAL),
            Value::Boolean(b) => Ok(boolean_to_decimal(*b)),
            Value::Int32(i) => Ok(int32_to_decimal(*i)),
            Value::Float64(f) => float64_to_decimal(*f),
            Value::Decimal(d) => Ok(*d),
            Value::String(s) => parse_decimal(s),
            Value::DateTime(_) => Err(CoercionError::cannot_convert(self.kind_name(), ResultKind::Decimal)),
            Value::Object(json) => json_scalar(json, ResultKind::Decimal)?.to_decimal(),
        }
    }

    /// Convert to the canonical text form. Null maps to the empty string.
    pub fn to_text(&self) -> CoercionResult<String> {
        match self {
            Value::Null => Ok(String::new()),
            Value::Boolean(b) => Ok(boolean_to_text(*b)),
            Value::Int32(i) => Ok(int32_to_text(*i)),
            Value::Float64(f) => Ok(float64_to_text(*f)),
            Value::Decimal(d) => Ok(decimal_to_text(*d)),
            Value::String(s) => Ok(s.clone()),
            Value::DateTime(dt) => Ok(datetime_to_text(*dt)),
            Value::Object(JsonValue::String(s)) => Ok(s.clone()),
            Value::Object(JsonValue::Null) => Ok(String::new()),
            Value::Object(json) => Ok(json.to_string()),
        }
    }

    /// Convert to DateTime. Only text (and DateTime itself) converts; NaN
    /// reads as absent like null.
    pub fn to_datetime(&self) -> CoercionResult<NaiveDateTime> {
        match self {
            Value::Null => Ok(ABSENT_DATETIME),
            Value::Float64(f) if f.is_nan() => Ok(ABSENT_DATETIME),
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => parse_datetime(s),
            Value::Object(json) => json_scalar(json, ResultKind::DateTime)?.to_datetime(),
            _ => Err(CoercionError::cannot_convert(self.kind_name(), ResultKind::DateTime)),
        }
    }

    /// Convert to a value of `kind`. Null stays null for every kind.
    pub fn coerce(&self, kind: ResultKind) -> CoercionResult<Value> {
        if self.is_null() || self.kind() == Some(kind) {
            return Ok(self.clone());
        }
        let value = match kind {
            ResultKind::Boolean => Value::Boolean(self.to_boolean()?),
            ResultKind::Int32 => Value::Int32(self.to_int32()?),
            ResultKind::Float64 => Value::Float64(self.to_float64()?),
            ResultKind::Decimal => Value::Decimal(self.to_decimal()?),
            ResultKind::String => Value::String(self.to_text()?),
            ResultKind::DateTime => Value::DateTime(self.to_datetime()?),
            ResultKind::Object => self.clone(),
        };
        Ok(value)
    }
}

/// Unwrap a JSON scalar into the matching value so it can be converted
/// with the ordinary rules.
fn json_scalar(json: &JsonValue, to: ResultKind) -> CoercionResult<Value> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i)
                    .map(Value::Int32)
                    .or_else(|_| parse_decimal(&n.to_string()).map(Value::Decimal))
            } else {
                n.as_f64()
                    .map(Value::Float64)
                    .ok_or_else(|| CoercionError::invalid_format(n.to_string(), to))
            }
        }
        JsonValue::Array(_) | JsonValue::Object(_) => {
            Err(CoercionError::cannot_convert("Object", to))
        }
    }
}
