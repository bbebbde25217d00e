//! Expression node variants

use crate::ids::{CacheKey, ExprId, FieldId};
use reportcloud_types::{ResultKind, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One node of the expression arena.
///
/// Children are referenced by [`ExprId`]. Nodes never hold computed values;
/// an aggregate only carries the key its result is cached under.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Constant value. A null literal still carries its declared kind.
    Literal { value: Value, kind: ResultKind },
    /// Value of a data field in the current row
    Field { field: FieldId, kind: ResultKind },
    Unary { op: UnaryOp, operand: ExprId },
    Binary { op: BinaryOp, lhs: ExprId, rhs: ExprId },
    Aggregate {
        func: AggregateFunc,
        inner: ExprId,
        scope: ScopeDescriptor,
        key: CacheKey,
        kind: ResultKind,
    },
}

impl Node {
    /// Static result kind of the node
    pub fn kind(&self) -> ResultKind {
        match self {
            Node::Literal { kind, .. } | Node::Field { kind, .. } | Node::Aggregate { kind, .. } => *kind,
            Node::Unary { op, .. } => op.result_kind(),
            Node::Binary { op, .. } => op.result_kind(),
        }
    }

    /// The literal value, if this node is a constant
    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Node::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Node::Literal { .. })
    }
}

/// Arithmetic operator, before specialization to a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Plus => "+",
            ArithOp::Minus => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
        }
    }
}

/// Comparison operator. Compares operands by their native ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Binary operator specialized to the kind it computes in.
///
/// The loader picks the variant from the statically known operand kinds; the
/// evaluator never branches on operand kinds at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    PlusInt32,
    PlusFloat64,
    PlusDecimal,
    MinusInt32,
    MinusFloat64,
    MinusDecimal,
    MultiplyInt32,
    MultiplyFloat64,
    MultiplyDecimal,
    DivideInt32,
    DivideFloat64,
    DivideDecimal,
    /// Text concatenation
    Concat,
    Compare(CompareOp),
    And,
    Or,
}

impl BinaryOp {
    /// Specialize an arithmetic operator to `kind`. Only numeric kinds have
    /// arithmetic variants.
    pub fn arithmetic(op: ArithOp, kind: ResultKind) -> Option<BinaryOp> {
        use BinaryOp::*;

        let specialized = match (op, kind) {
            (ArithOp::Plus, ResultKind::Int32) => PlusInt32,
            (ArithOp::Plus, ResultKind::Float64) => PlusFloat64,
            (ArithOp::Plus, ResultKind::Decimal) => PlusDecimal,
            (ArithOp::Minus, ResultKind::Int32) => MinusInt32,
            (ArithOp::Minus, ResultKind::Float64) => MinusFloat64,
            (ArithOp::Minus, ResultKind::Decimal) => MinusDecimal,
            (ArithOp::Multiply, ResultKind::Int32) => MultiplyInt32,
            (ArithOp::Multiply, ResultKind::Float64) => MultiplyFloat64,
            (ArithOp::Multiply, ResultKind::Decimal) => MultiplyDecimal,
            (ArithOp::Divide, ResultKind::Int32) => DivideInt32,
            (ArithOp::Divide, ResultKind::Float64) => DivideFloat64,
            (ArithOp::Divide, ResultKind::Decimal) => DivideDecimal,
            _ => return None,
        };
        Some(specialized)
    }

    /// Split an arithmetic variant back into operator and kind
    pub fn as_arithmetic(&self) -> Option<(ArithOp, ResultKind)> {
        use BinaryOp::*;

        let parts = match self {
            PlusInt32 => (ArithOp::Plus, ResultKind::Int32),
            PlusFloat64 => (ArithOp::Plus, ResultKind::Float64),
            PlusDecimal => (ArithOp::Plus, ResultKind::Decimal),
            MinusInt32 => (ArithOp::Minus, ResultKind::Int32),
            MinusFloat64 => (ArithOp::Minus, ResultKind::Float64),
            MinusDecimal => (ArithOp::Minus, ResultKind::Decimal),
            MultiplyInt32 => (ArithOp::Multiply, ResultKind::Int32),
            MultiplyFloat64 => (ArithOp::Multiply, ResultKind::Float64),
            MultiplyDecimal => (ArithOp::Multiply, ResultKind::Decimal),
            DivideInt32 => (ArithOp::Divide, ResultKind::Int32),
            DivideFloat64 => (ArithOp::Divide, ResultKind::Float64),
            DivideDecimal => (ArithOp::Divide, ResultKind::Decimal),
            Concat | Compare(_) | And | Or => return None,
        };
        Some(parts)
    }

    /// Kind the result is produced in
    pub fn result_kind(&self) -> ResultKind {
        match self {
            BinaryOp::Concat => ResultKind::String,
            BinaryOp::Compare(_) | BinaryOp::And | BinaryOp::Or => ResultKind::Boolean,
            arith => arith.as_arithmetic().map_or(ResultKind::Object, |(_, kind)| kind),
        }
    }

    /// Kind both operands are read in. Comparisons read operands in their
    /// own kinds.
    pub fn operand_kind(&self) -> Option<ResultKind> {
        match self {
            BinaryOp::Compare(_) => None,
            BinaryOp::And | BinaryOp::Or => Some(ResultKind::Boolean),
            op => Some(op.result_kind()),
        }
    }

    /// Name used in dumps and diagnostics, e.g. `+int32`
    pub fn name(&self) -> String {
        match self {
            BinaryOp::Concat => "concat".to_string(),
            BinaryOp::Compare(op) => op.symbol().to_string(),
            BinaryOp::And => "and".to_string(),
            BinaryOp::Or => "or".to_string(),
            op => match op.as_arithmetic() {
                Some((arith, kind)) => format!("{}{}", arith.symbol(), kind.name().to_lowercase()),
                None => format!("{:?}", op),
            },
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Unary operator specialized to its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    NegateInt32,
    NegateFloat64,
    NegateDecimal,
    Not,
}

impl UnaryOp {
    /// Specialize negation to a numeric kind
    pub fn negate(kind: ResultKind) -> Option<UnaryOp> {
        match kind {
            ResultKind::Int32 => Some(UnaryOp::NegateInt32),
            ResultKind::Float64 => Some(UnaryOp::NegateFloat64),
            ResultKind::Decimal => Some(UnaryOp::NegateDecimal),
            _ => None,
        }
    }

    pub fn result_kind(&self) -> ResultKind {
        match self {
            UnaryOp::NegateInt32 => ResultKind::Int32,
            UnaryOp::NegateFloat64 => ResultKind::Float64,
            UnaryOp::NegateDecimal => ResultKind::Decimal,
            UnaryOp::Not => ResultKind::Boolean,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnaryOp::NegateInt32 => "neg-int32",
            UnaryOp::NegateFloat64 => "neg-float64",
            UnaryOp::NegateDecimal => "neg-decimal",
            UnaryOp::Not => "not",
        }
    }
}

/// Aggregate reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunc {
    /// Running maximum in the inner kind
    Max,
    /// Population standard deviation, computed in Float64
    Stdevp,
}

impl AggregateFunc {
    /// Result kind of the aggregate given the kind of its inner expression
    pub fn result_kind(&self, inner: ResultKind) -> ResultKind {
        match self {
            AggregateFunc::Max => inner,
            AggregateFunc::Stdevp => ResultKind::Float64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Max => "max",
            AggregateFunc::Stdevp => "stdevp",
        }
    }

    pub fn parse(name: &str) -> Option<AggregateFunc> {
        match name.to_ascii_lowercase().as_str() {
            "max" => Some(AggregateFunc::Max),
            "stdevp" => Some(AggregateFunc::Stdevp),
            _ => None,
        }
    }
}

/// Which rows an aggregate ranges over.
///
/// Resolved against the current row at evaluation time; the same descriptor
/// yields different rows in different groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScopeDescriptor {
    /// Innermost enclosing group, or the dataset outside of any group
    #[default]
    Default,
    /// Every row of a named dataset
    DataSet { name: String },
    /// The instance of a named group containing the current row
    Group { name: String },
    /// Intersection of a row group and a column group of a matrix
    Cell { row_group: String, column_group: String },
}

impl fmt::Display for ScopeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeDescriptor::Default => write!(f, "@default"),
            ScopeDescriptor::DataSet { name } => write!(f, "@dataset:{}", name),
            ScopeDescriptor::Group { name } => write!(f, "@group:{}", name),
            ScopeDescriptor::Cell { row_group, column_group } => {
                write!(f, "@cell:{}/{}", row_group, column_group)
            }
        }
    }
}
