//! Evaluation errors

use reportcloud_diagnostics::{ErrorCode, RC0200, RC0201, RC0202, RC0203, RC0204, RC0205};
use reportcloud_expr::{ArithmeticError, ExprId, FieldId};
use reportcloud_types::CoercionError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised while evaluating an expression.
///
/// Failures stay local to the execution instance they happened in; the
/// caller decides whether to treat the value as absent.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// A typed entry point was asked for a conversion that is not defined
    #[error("Conversion failed: {0}")]
    Conversion(#[from] CoercionError),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },

    #[error("Values not comparable: {lhs} and {rhs}")]
    NotComparable { lhs: String, rhs: String },

    #[error("Field {field} not found")]
    FieldNotFound { field: String },

    /// The id does not belong to the tree being evaluated
    #[error("Unknown expression node {id:?}")]
    UnknownNode { id: ExprId },

    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// Create a conversion error between two kinds
    pub fn conversion(from: impl Into<String>, to: reportcloud_types::ResultKind) -> Self {
        Self::Conversion(CoercionError::cannot_convert(from, to))
    }

    pub fn field_not_found(field: FieldId) -> Self {
        Self::FieldNotFound {
            field: field.to_string(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the failure came from a typed conversion
    pub fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }

    /// Diagnostic code of the failure
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Conversion(_) => RC0203,
            Self::DivisionByZero => RC0201,
            Self::Overflow { .. } => RC0202,
            Self::NotComparable { .. } => RC0205,
            Self::FieldNotFound { .. } => RC0204,
            Self::UnknownNode { .. } | Self::Internal { .. } => RC0200,
        }
    }
}

impl From<ArithmeticError> for EvalError {
    fn from(err: ArithmeticError) -> Self {
        match err {
            ArithmeticError::DivisionByZero => Self::DivisionByZero,
            ArithmeticError::Overflow { operation } => Self::Overflow { operation },
            ArithmeticError::NotComparable { lhs, rhs } => Self::NotComparable { lhs, rhs },
            ArithmeticError::Coercion(e) => Self::Conversion(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportcloud_types::ResultKind;

    #[test]
    fn test_arithmetic_coercion_becomes_conversion() {
        let err: EvalError = ArithmeticError::Coercion(CoercionError::invalid_format("x", ResultKind::Int32)).into();
        assert!(err.is_conversion());
        assert_eq!(err.code(), RC0203);
    }

    #[test]
    fn test_codes() {
        assert_eq!(EvalError::DivisionByZero.code(), RC0201);
        assert_eq!(EvalError::field_not_found(FieldId(3)).to_string(), "Field $3 not found");
    }
}
