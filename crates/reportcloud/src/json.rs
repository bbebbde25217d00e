//! Conversions between JSON and runtime values

use crate::error::{ReportError, ReportResult};
use crate::fields::Fields;
use reportcloud_types::coercion::{CoercionResult, datetime_to_text};
use reportcloud_types::{ResultKind, Value};
use serde_json::{Number, Value as JsonValue};

/// Convert a JSON value to a runtime value of `kind`.
///
/// JSON null stays null; Object keeps the JSON as is.
pub fn to_value(json: &JsonValue, kind: ResultKind) -> CoercionResult<Value> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    Value::Object(json.clone()).coerce(kind)
}

/// A literal's value with the kind its JSON form suggests
pub fn infer_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
            Some(i) => Value::Int32(i),
            None => n.as_f64().map_or_else(|| Value::Object(json.clone()), Value::Float64),
        },
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Object(json.clone()),
    }
}

/// Render a runtime value as plain JSON.
///
/// Decimals are written as strings so no digits are lost; NaN becomes null.
pub fn from_value(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Int32(i) => JsonValue::from(*i),
        Value::Float64(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Decimal(d) => JsonValue::String(d.to_string()),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::DateTime(dt) => JsonValue::String(datetime_to_text(*dt)),
        Value::Object(json) => json.clone(),
    }
}

/// Convert JSON rows into positional rows for a data set.
///
/// A row is either an array in column order or an object keyed by field
/// name. Object keys that name no field are ignored.
pub fn load_rows(fields: &Fields, rows: &[JsonValue]) -> ReportResult<Vec<Vec<Value>>> {
    let width = fields.column_names().len();
    rows.iter()
        .enumerate()
        .map(|(index, row)| -> ReportResult<Vec<Value>> {
            let mut values = vec![Value::Null; width];
            match row {
                JsonValue::Array(items) => {
                    for (column, item) in items.iter().take(width).enumerate() {
                        let kind = fields.column_kind(column);
                        values[column] = to_value(item, kind).map_err(|e| {
                            ReportError::row(index, fields.column_names()[column].clone(), e)
                        })?;
                    }
                }
                JsonValue::Object(map) => {
                    for (name, item) in map {
                        if let Some(field) = fields.get(name) {
                            values[field.column.index()] = to_value(item, field.kind)
                                .map_err(|e| ReportError::row(index, field.name.clone(), e))?;
                        }
                    }
                }
                other => {
                    return Err(ReportError::Json(serde::de::Error::custom(format!(
                        "row {} must be an array or an object, found {}",
                        index, other
                    ))));
                }
            }
            Ok(values)
        })
        .collect()
}
