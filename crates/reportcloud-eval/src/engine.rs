//! Typed expression evaluation
//!
//! Every node computes in its native kind; the typed entry points convert
//! the native result on the way out. Operands are never converted on the
//! way in: a specialized operator reads each operand value exactly the way
//! that operand's own typed entry point would.

use crate::error::{EvalError, EvalResult};
use crate::instance::ExecutionInstance;
use crate::options::EngineOptions;
use crate::scope::RowId;
use reportcloud_expr::{ExprId, ExprTree, Node, kernel};
use reportcloud_types::{Decimal, NaiveDateTime, ResultKind, Value};
use std::sync::Arc;

/// Evaluator over one frozen expression tree.
///
/// The engine itself holds no mutable state and can be shared; everything a
/// run mutates lives on the [`ExecutionInstance`] passed to each call.
#[derive(Debug, Clone)]
pub struct ExprEngine {
    tree: Arc<ExprTree>,
    options: EngineOptions,
}

impl ExprEngine {
    pub fn new(tree: Arc<ExprTree>) -> Self {
        Self::with_options(tree, EngineOptions::default())
    }

    pub fn with_options(tree: Arc<ExprTree>, options: EngineOptions) -> Self {
        Self { tree, options }
    }

    pub fn tree(&self) -> &ExprTree {
        &self.tree
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Static result kind of a node
    pub fn kind(&self, id: ExprId) -> EvalResult<ResultKind> {
        self.node(id).map(Node::kind)
    }

    pub(crate) fn node(&self, id: ExprId) -> EvalResult<&Node> {
        self.tree.get(id).ok_or(EvalError::UnknownNode { id })
    }

    // ========================================================================
    // Typed entry points
    // ========================================================================

    /// Generic entry point. Absent results (null, NaN) come back as null.
    pub fn evaluate(&self, id: ExprId, instance: &mut ExecutionInstance, row: Option<RowId>) -> EvalResult<Value> {
        let value = self.eval_native(id, instance, row)?;
        Ok(if value.is_absent() { Value::Null } else { value })
    }

    pub fn eval_boolean(&self, id: ExprId, instance: &mut ExecutionInstance, row: Option<RowId>) -> EvalResult<bool> {
        Ok(self.eval_native(id, instance, row)?.to_boolean()?)
    }

    /// Absent results read as `i32::MIN`
    pub fn eval_int32(&self, id: ExprId, instance: &mut ExecutionInstance, row: Option<RowId>) -> EvalResult<i32> {
        Ok(self.eval_native(id, instance, row)?.to_int32()?)
    }

    /// Absent results read as NaN
    pub fn eval_float64(&self, id: ExprId, instance: &mut ExecutionInstance, row: Option<RowId>) -> EvalResult<f64> {
        Ok(self.eval_native(id, instance, row)?.to_float64()?)
    }

    /// Absent results read as `Decimal::MIN`
    pub fn eval_decimal(&self, id: ExprId, instance: &mut ExecutionInstance, row: Option<RowId>) -> EvalResult<Decimal> {
        Ok(self.eval_native(id, instance, row)?.to_decimal()?)
    }

    /// Absent results read as the empty string
    pub fn eval_string(&self, id: ExprId, instance: &mut ExecutionInstance, row: Option<RowId>) -> EvalResult<String> {
        Ok(self.eval_native(id, instance, row)?.to_text()?)
    }

    /// Absent results read as `NaiveDateTime::MIN`
    pub fn eval_datetime(
        &self,
        id: ExprId,
        instance: &mut ExecutionInstance,
        row: Option<RowId>,
    ) -> EvalResult<NaiveDateTime> {
        Ok(self.eval_native(id, instance, row)?.to_datetime()?)
    }

    /// Evaluate through the entry point matching `kind`, packed back into a
    /// value of that kind
    pub fn eval_as(
        &self,
        id: ExprId,
        kind: ResultKind,
        instance: &mut ExecutionInstance,
        row: Option<RowId>,
    ) -> EvalResult<Value> {
        let value = match kind {
            ResultKind::Boolean => Value::Boolean(self.eval_boolean(id, instance, row)?),
            ResultKind::Int32 => Value::Int32(self.eval_int32(id, instance, row)?),
            ResultKind::Float64 => Value::Float64(self.eval_float64(id, instance, row)?),
            ResultKind::Decimal => Value::Decimal(self.eval_decimal(id, instance, row)?),
            ResultKind::String => Value::String(self.eval_string(id, instance, row)?),
            ResultKind::DateTime => Value::DateTime(self.eval_datetime(id, instance, row)?),
            ResultKind::Object => self.evaluate(id, instance, row)?,
        };
        Ok(value)
    }

    // ========================================================================
    // Native evaluation
    // ========================================================================

    /// Value of `id` in its own kind. NaN is kept as is.
    pub(crate) fn eval_native(
        &self,
        id: ExprId,
        instance: &mut ExecutionInstance,
        row: Option<RowId>,
    ) -> EvalResult<Value> {
        match self.node(id)? {
            Node::Literal { value, .. } => Ok(value.clone()),

            Node::Field { field, kind } => match row {
                Some(row) => {
                    let raw = instance.data().field_value(row, *field)?;
                    Ok(raw.coerce(*kind)?)
                }
                None => Ok(Value::Null),
            },

            Node::Unary { op, operand } => {
                let value = self.eval_native(*operand, instance, row)?;
                Ok(kernel::apply_unary(*op, &value)?)
            }

            Node::Binary { op, lhs, rhs } => {
                let (op, lhs, rhs) = (*op, *lhs, *rhs);
                let l = self.eval_native(lhs, instance, row)?;
                let r = self.eval_native(rhs, instance, row)?;
                Ok(kernel::apply_binary(op, &l, &r)?)
            }

            Node::Aggregate {
                func, inner, scope, key, ..
            } => self.eval_aggregate(*func, *inner, scope, *key, instance, row),
        }
    }
}
