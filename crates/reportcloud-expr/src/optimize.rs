//! Constant folding and identity elimination
//!
//! Runs once per root after construction. The rewrite is structural: a
//! changed node is re-allocated and its new id returned to the parent, the
//! old node is left unreachable. Unchanged subtrees keep their ids, which
//! makes a second pass return the root it was given.

use crate::builder::ExprBuilder;
use crate::ids::ExprId;
use crate::kernel::{self, is_one, is_zero};
use crate::node::{ArithOp, BinaryOp, Node};
use reportcloud_diagnostics::RC0102;
use reportcloud_types::{ResultKind, Value};

impl ExprBuilder {
    /// Fold constant subtrees of `root` and drop algebraic identities.
    ///
    /// Returns the id to install in place of `root`. Never reads row data.
    pub fn optimize(&mut self, root: ExprId) -> ExprId {
        match self.node(root).clone() {
            Node::Literal { .. } | Node::Field { .. } => root,

            Node::Unary { op, operand } => {
                let new_operand = self.optimize(operand);
                if let Some(value) = self.node(new_operand).as_constant().cloned() {
                    match kernel::apply_unary(op, &value) {
                        Ok(folded) => return self.fold_to(folded, op.result_kind()),
                        Err(e) => self.fold_failed(root, &op.name().to_string(), &e.to_string()),
                    }
                }
                if new_operand == operand {
                    root
                } else {
                    self.alloc(Node::Unary { op, operand: new_operand })
                }
            }

            Node::Binary { op, lhs, rhs } => {
                let new_lhs = self.optimize(lhs);
                let new_rhs = self.optimize(rhs);
                let lhs_const = self.node(new_lhs).as_constant().cloned();
                let rhs_const = self.node(new_rhs).as_constant().cloned();

                match (lhs_const, rhs_const) {
                    (Some(a), Some(b)) => match kernel::apply_binary(op, &a, &b) {
                        Ok(folded) => return self.fold_to(folded, op.result_kind()),
                        Err(e) => self.fold_failed(root, &op.name(), &e.to_string()),
                    },
                    (None, Some(b)) => {
                        if let Some(kept) = self.right_identity(op, new_lhs, &b) {
                            return kept;
                        }
                    }
                    (Some(a), None) => {
                        if let Some(kept) = self.left_identity(op, &a, new_rhs) {
                            return kept;
                        }
                    }
                    (None, None) => {}
                }

                if new_lhs == lhs && new_rhs == rhs {
                    root
                } else {
                    self.alloc(Node::Binary {
                        op,
                        lhs: new_lhs,
                        rhs: new_rhs,
                    })
                }
            }

            Node::Aggregate {
                func,
                inner,
                scope,
                key,
                kind,
            } => {
                let new_inner = self.optimize(inner);
                if new_inner == inner {
                    root
                } else {
                    // Same occurrence, same cache slot
                    self.alloc(Node::Aggregate {
                        func,
                        inner: new_inner,
                        scope,
                        key,
                        kind,
                    })
                }
            }
        }
    }

    fn fold_to(&mut self, value: Value, kind: ResultKind) -> ExprId {
        log::trace!("folded constant {} ({})", value, kind);
        self.alloc(Node::Literal { value, kind })
    }

    fn fold_failed(&mut self, id: ExprId, op: &str, reason: &str) {
        if self.mark_unfoldable(id) {
            self.log_mut().warning(
                RC0102,
                format!("Constant expression '{}' could not be folded: {}", op, reason),
            );
        }
    }

    /// `x op c` where `c` is the identity of `op`
    fn right_identity(&self, op: BinaryOp, lhs: ExprId, constant: &Value) -> Option<ExprId> {
        let keep = match op.as_arithmetic() {
            Some((ArithOp::Plus, kind)) => is_zero(constant, kind) && zero_sign_is(constant, kind, true),
            Some((ArithOp::Minus, kind)) => is_zero(constant, kind) && zero_sign_is(constant, kind, false),
            Some((ArithOp::Multiply | ArithOp::Divide, kind)) => is_one(constant, kind),
            None => op == BinaryOp::Concat && is_empty_text(constant),
        };
        (keep && self.kind(lhs) == op.result_kind()).then_some(lhs)
    }

    /// `c op x` where `c` is the identity of `op`
    fn left_identity(&self, op: BinaryOp, constant: &Value, rhs: ExprId) -> Option<ExprId> {
        let keep = match op.as_arithmetic() {
            Some((ArithOp::Plus, kind)) => is_zero(constant, kind) && zero_sign_is(constant, kind, true),
            Some((ArithOp::Multiply, kind)) => is_one(constant, kind),
            Some(_) => false,
            None => op == BinaryOp::Concat && is_empty_text(constant),
        };
        (keep && self.kind(rhs) == op.result_kind()).then_some(rhs)
    }
}

/// Float64 zeros are only an exact identity with the right sign: `x + -0.0`
/// and `x - 0.0` keep `x == -0.0` intact, `x + 0.0` turns it into `0.0`.
fn zero_sign_is(zero: &Value, kind: ResultKind, negative: bool) -> bool {
    kind != ResultKind::Float64 || zero.to_float64().is_ok_and(|f| f.is_sign_negative() == negative)
}

fn is_empty_text(value: &Value) -> bool {
    matches!(value, Value::String(s) if s.is_empty())
}
