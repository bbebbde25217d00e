//! Static result kinds

use crate::Value;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The static result kind of an expression node.
///
/// Assigned once when the node is constructed and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Boolean,
    Int32,
    Float64,
    Decimal,
    String,
    DateTime,
    /// Opaque value, evaluated only through the generic entry point
    Object,
}

impl ResultKind {
    /// All kinds, in declaration order
    pub const ALL: [ResultKind; 7] = [
        ResultKind::Boolean,
        ResultKind::Int32,
        ResultKind::Float64,
        ResultKind::Decimal,
        ResultKind::String,
        ResultKind::DateTime,
        ResultKind::Object,
    ];

    /// Get the simple name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            ResultKind::Boolean => "Boolean",
            ResultKind::Int32 => "Int32",
            ResultKind::Float64 => "Float64",
            ResultKind::Decimal => "Decimal",
            ResultKind::String => "String",
            ResultKind::DateTime => "DateTime",
            ResultKind::Object => "Object",
        }
    }

    /// Check if this is one of the arithmetic kinds
    pub fn is_numeric(&self) -> bool {
        matches!(self, ResultKind::Int32 | ResultKind::Float64 | ResultKind::Decimal)
    }

    /// The kind binary arithmetic over `self` and `other` is carried out in.
    ///
    /// - Int32 op Int32 -> Int32
    /// - Int32/Decimal op Decimal -> Decimal
    /// - anything numeric op Float64 -> Float64
    ///
    /// Returns `None` when either side is not numeric.
    pub fn promote(self, other: ResultKind) -> Option<ResultKind> {
        use ResultKind::{Decimal, Float64, Int32};

        match (self, other) {
            (Int32, Int32) => Some(Int32),
            (Float64, k) | (k, Float64) if k.is_numeric() => Some(Float64),
            (Decimal, Int32) | (Int32, Decimal) | (Decimal, Decimal) => Some(Decimal),
            _ => None,
        }
    }

    /// Minimum constant of the kind.
    ///
    /// For Int32, Decimal and DateTime this is also the value typed accessors
    /// return for an absent result.
    pub fn sentinel(&self) -> Value {
        match self {
            ResultKind::Boolean => Value::Boolean(true),
            ResultKind::Int32 => Value::Int32(i32::MIN),
            ResultKind::Float64 => Value::Float64(f64::MIN),
            ResultKind::Decimal => Value::Decimal(Decimal::MIN),
            ResultKind::String | ResultKind::Object => Value::String(String::new()),
            ResultKind::DateTime => Value::DateTime(NaiveDateTime::MIN),
        }
    }

    /// Parse a kind name, ignoring case. Accepts the common aliases used in
    /// report definitions (`integer`, `double`, `text`, `timestamp`, ...).
    pub fn parse(name: &str) -> Option<ResultKind> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => ResultKind::Boolean,
            "int32" | "int" | "integer" => ResultKind::Int32,
            "float64" | "float" | "double" => ResultKind::Float64,
            "decimal" => ResultKind::Decimal,
            "string" | "text" => ResultKind::String,
            "datetime" | "timestamp" | "date" => ResultKind::DateTime,
            "object" => ResultKind::Object,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
