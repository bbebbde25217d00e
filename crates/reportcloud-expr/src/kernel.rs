//! Native operator kernels
//!
//! Each specialized operator computes in exactly one kind. Operand values
//! arrive already produced by their own nodes and are read through that
//! kind's conversion, the same way a typed entry point would read them.
//! Shared by the optimizer (folding constants) and the evaluator.

use crate::node::{ArithOp, BinaryOp, CompareOp, UnaryOp};
use reportcloud_types::{CoercionError, ResultKind, Value};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use thiserror::Error;

/// Errors raised by operator kernels
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArithmeticError {
    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },

    #[error("Cannot compare {lhs} with {rhs}")]
    NotComparable { lhs: String, rhs: String },

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl ArithmeticError {
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    fn not_comparable(lhs: &Value, rhs: &Value) -> Self {
        Self::NotComparable {
            lhs: lhs.kind().map_or("Null", |k| k.name()).to_string(),
            rhs: rhs.kind().map_or("Null", |k| k.name()).to_string(),
        }
    }
}

pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

// ============================================================================
// Per-kind arithmetic
// ============================================================================

/// Fixed-width arithmetic. Overflow wraps.
pub fn int32(op: ArithOp, a: i32, b: i32) -> ArithmeticResult<i32> {
    match op {
        ArithOp::Plus => Ok(a.wrapping_add(b)),
        ArithOp::Minus => Ok(a.wrapping_sub(b)),
        ArithOp::Multiply => Ok(a.wrapping_mul(b)),
        ArithOp::Divide => {
            if b == 0 {
                Err(ArithmeticError::DivisionByZero)
            } else {
                Ok(a.wrapping_div(b))
            }
        }
    }
}

/// IEEE-754 arithmetic. NaN propagates, division by zero gives infinity.
pub fn float64(op: ArithOp, a: f64, b: f64) -> f64 {
    match op {
        ArithOp::Plus => a + b,
        ArithOp::Minus => a - b,
        ArithOp::Multiply => a * b,
        ArithOp::Divide => a / b,
    }
}

/// Exact fixed-point arithmetic
pub fn decimal(op: ArithOp, a: Decimal, b: Decimal) -> ArithmeticResult<Decimal> {
    let result = match op {
        ArithOp::Plus => a.checked_add(b),
        ArithOp::Minus => a.checked_sub(b),
        ArithOp::Multiply => a.checked_mul(b),
        ArithOp::Divide => {
            if b.is_zero() {
                return Err(ArithmeticError::DivisionByZero);
            }
            a.checked_div(b)
        }
    };
    result.ok_or_else(|| ArithmeticError::overflow(format!("Decimal {}", op.symbol())))
}

/// Compare by native ordering. Equality falls back to structural equality
/// for kinds without an ordering.
pub fn compare(op: CompareOp, a: &Value, b: &Value) -> ArithmeticResult<bool> {
    let ordering = a.compare(b);
    let result = match (op, ordering) {
        (CompareOp::Eq, Some(o)) => o == Ordering::Equal,
        (CompareOp::Ne, Some(o)) => o != Ordering::Equal,
        (CompareOp::Eq, None) => a == b,
        (CompareOp::Ne, None) => a != b,
        (CompareOp::Lt, Some(o)) => o == Ordering::Less,
        (CompareOp::Le, Some(o)) => o != Ordering::Greater,
        (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
        (CompareOp::Ge, Some(o)) => o != Ordering::Less,
        (_, None) => return Err(ArithmeticError::not_comparable(a, b)),
    };
    Ok(result)
}

// ============================================================================
// Node-level application
// ============================================================================

/// Apply a specialized binary operator to two operand values.
///
/// A null operand makes the result null, except for concatenation (null
/// reads as empty text) and the logical operators (three-valued).
pub fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> ArithmeticResult<Value> {
    match op {
        BinaryOp::Concat => {
            let mut text = lhs.to_text()?;
            text.push_str(&rhs.to_text()?);
            Ok(Value::String(text))
        }
        BinaryOp::And => logical(lhs, rhs, false),
        BinaryOp::Or => logical(lhs, rhs, true),
        _ if lhs.is_null() || rhs.is_null() => Ok(Value::Null),
        BinaryOp::Compare(cmp) => compare(cmp, lhs, rhs).map(Value::Boolean),
        arith => {
            let Some((op, kind)) = arith.as_arithmetic() else {
                return Ok(Value::Null);
            };
            match kind {
                ResultKind::Int32 => int32(op, lhs.to_int32()?, rhs.to_int32()?).map(Value::Int32),
                ResultKind::Decimal => decimal(op, lhs.to_decimal()?, rhs.to_decimal()?).map(Value::Decimal),
                _ => Ok(Value::Float64(float64(op, lhs.to_float64()?, rhs.to_float64()?))),
            }
        }
    }
}

/// Three-valued And (`dominant = false`) / Or (`dominant = true`)
fn logical(lhs: &Value, rhs: &Value, dominant: bool) -> ArithmeticResult<Value> {
    let read = |v: &Value| -> ArithmeticResult<Option<bool>> {
        if v.is_null() { Ok(None) } else { Ok(Some(v.to_boolean()?)) }
    };
    let (a, b) = (read(lhs)?, read(rhs)?);
    if a == Some(dominant) || b == Some(dominant) {
        return Ok(Value::Boolean(dominant));
    }
    match (a, b) {
        (Some(_), Some(_)) => Ok(Value::Boolean(!dominant)),
        _ => Ok(Value::Null),
    }
}

/// Apply a specialized unary operator. Null stays null.
pub fn apply_unary(op: UnaryOp, operand: &Value) -> ArithmeticResult<Value> {
    if operand.is_null() {
        return Ok(Value::Null);
    }
    let value = match op {
        UnaryOp::NegateInt32 => Value::Int32(operand.to_int32()?.wrapping_neg()),
        UnaryOp::NegateFloat64 => Value::Float64(-operand.to_float64()?),
        UnaryOp::NegateDecimal => Value::Decimal(-operand.to_decimal()?),
        UnaryOp::Not => Value::Boolean(!operand.to_boolean()?),
    };
    Ok(value)
}

/// Whether `value`, read in `kind`, is the additive identity
pub(crate) fn is_zero(value: &Value, kind: ResultKind) -> bool {
    match (kind, value) {
        (ResultKind::Int32, Value::Int32(i)) => *i == 0,
        (ResultKind::Decimal, Value::Decimal(d)) => d.is_zero(),
        (ResultKind::Decimal, Value::Int32(i)) => *i == 0,
        (ResultKind::Float64, v) if !v.is_null() => v.to_float64().is_ok_and(|f| f == 0.0),
        _ => false,
    }
}

/// Whether `value`, read in `kind`, is the multiplicative identity
pub(crate) fn is_one(value: &Value, kind: ResultKind) -> bool {
    match (kind, value) {
        (ResultKind::Int32, Value::Int32(i)) => *i == 1,
        (ResultKind::Decimal, Value::Decimal(d)) => *d == Decimal::ONE,
        (ResultKind::Decimal, Value::Int32(i)) => *i == 1,
        (ResultKind::Float64, v) if !v.is_null() => v.to_float64().is_ok_and(|f| f == 1.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_int32_minus_stays_int32() {
        assert_eq!(
            apply_binary(BinaryOp::MinusInt32, &Value::Int32(7), &Value::Int32(10)).unwrap(),
            Value::Int32(-3)
        );
    }

    #[test]
    fn test_int32_wraps() {
        assert_eq!(int32(ArithOp::Minus, i32::MIN, 1).unwrap(), i32::MAX);
        assert_eq!(int32(ArithOp::Plus, i32::MAX, 1).unwrap(), i32::MIN);
        assert_eq!(int32(ArithOp::Divide, i32::MIN, -1).unwrap(), i32::MIN);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(int32(ArithOp::Divide, 1, 0), Err(ArithmeticError::DivisionByZero));
        assert_eq!(
            decimal(ArithOp::Divide, Decimal::ONE, Decimal::ZERO),
            Err(ArithmeticError::DivisionByZero)
        );
        assert!(float64(ArithOp::Divide, 1.0, 0.0).is_infinite());
    }

    #[test]
    fn test_decimal_is_exact() {
        let a = Decimal::from_str("0.1").unwrap();
        let b = Decimal::from_str("0.2").unwrap();
        assert_eq!(decimal(ArithOp::Plus, a, b).unwrap(), Decimal::from_str("0.3").unwrap());
    }

    #[test]
    fn test_float_nan_propagates() {
        let v = apply_binary(BinaryOp::PlusFloat64, &Value::Float64(f64::NAN), &Value::Float64(1.0)).unwrap();
        assert!(v.is_absent());
    }

    #[test]
    fn test_null_propagation() {
        assert_eq!(
            apply_binary(BinaryOp::PlusInt32, &Value::Null, &Value::Int32(1)).unwrap(),
            Value::Null
        );
        assert_eq!(
            apply_binary(BinaryOp::Concat, &Value::Null, &Value::string("a")).unwrap(),
            Value::string("a")
        );
    }

    #[test]
    fn test_three_valued_logic() {
        let t = Value::Boolean(true);
        let f = Value::Boolean(false);
        assert_eq!(apply_binary(BinaryOp::And, &Value::Null, &f).unwrap(), f);
        assert_eq!(apply_binary(BinaryOp::And, &Value::Null, &t).unwrap(), Value::Null);
        assert_eq!(apply_binary(BinaryOp::Or, &Value::Null, &t).unwrap(), t);
        assert_eq!(apply_binary(BinaryOp::Or, &f, &f).unwrap(), f);
    }

    #[test]
    fn test_compare_incomparable() {
        let err = compare(CompareOp::Lt, &Value::Int32(1), &Value::string("a")).unwrap_err();
        assert!(matches!(err, ArithmeticError::NotComparable { .. }));
        assert!(!compare(CompareOp::Eq, &Value::Int32(1), &Value::string("1")).unwrap());
    }
}
