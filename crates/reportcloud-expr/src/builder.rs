//! Construction of expression trees

use crate::ids::{CacheKey, ExprId, FieldId};
use crate::node::{AggregateFunc, ArithOp, BinaryOp, CompareOp, Node, ScopeDescriptor, UnaryOp};
use crate::dump;
use crate::tree::ExprTree;
use reportcloud_diagnostics::{RC0003, RC0101, ReportLog};
use reportcloud_types::{ResultKind, Value};
use std::collections::HashSet;

/// Builds the expression arena of one report definition.
///
/// The builder is the only producer of nodes. It owns the counter cache keys
/// are drawn from, so keys are unique per definition without any process
/// wide state. Construction never fails: problems are recorded in the
/// builder's [`ReportLog`] and the offending node degrades to a typed null.
#[derive(Debug, Default)]
pub struct ExprBuilder {
    nodes: Vec<Node>,
    next_key: u32,
    log: ReportLog,
    unfoldable: HashSet<ExprId>,
}

impl ExprBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, node: Node) -> ExprId {
        let id = ExprId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get a node by id
    ///
    /// # Panics
    /// Panics if `id` was not produced by this builder.
    #[track_caller]
    pub fn node(&self, id: ExprId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Static result kind of a node
    #[track_caller]
    pub fn kind(&self, id: ExprId) -> ResultKind {
        self.node(id).kind()
    }

    /// Diagnostics recorded so far
    pub fn log(&self) -> &ReportLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ReportLog {
        &mut self.log
    }

    /// Remember a node whose constant operands failed to fold. Returns
    /// `false` if it was already known.
    pub(crate) fn mark_unfoldable(&mut self, id: ExprId) -> bool {
        self.unfoldable.insert(id)
    }

    /// Render a node as an S-expression
    pub fn dump(&self, id: ExprId) -> String {
        dump::render(&self.nodes, id)
    }

    // ========================================================================
    // Leaves
    // ========================================================================

    /// Constant of the value's own kind. A bare null is an Object null.
    pub fn literal(&mut self, value: Value) -> ExprId {
        let kind = value.kind().unwrap_or(ResultKind::Object);
        self.alloc(Node::Literal { value, kind })
    }

    /// Null constant declared as `kind`
    pub fn null(&mut self, kind: ResultKind) -> ExprId {
        self.alloc(Node::Literal { value: Value::Null, kind })
    }

    /// Reference to a data field of the current row
    pub fn field(&mut self, field: FieldId, kind: ResultKind) -> ExprId {
        self.alloc(Node::Field { field, kind })
    }

    /// Use `child` if present; otherwise report that `owner` requires
    /// `element` and stand in a null of `kind`.
    pub fn require(&mut self, child: Option<ExprId>, owner: &str, element: &str, kind: ResultKind) -> ExprId {
        match child {
            Some(id) => id,
            None => {
                self.log
                    .log_error(8, RC0003, format!("{} requires the {} element.", owner, element));
                self.null(kind)
            }
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Build an already specialized binary node
    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.alloc(Node::Binary { op, lhs, rhs })
    }

    /// Build `lhs op rhs`, specialized to the kind the operand kinds
    /// promote to. `+` on text becomes concatenation.
    pub fn arithmetic(&mut self, op: ArithOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let (lk, rk) = (self.kind(lhs), self.kind(rhs));

        if op == ArithOp::Plus && (lk == ResultKind::String || rk == ResultKind::String) {
            return self.binary(BinaryOp::Concat, lhs, rhs);
        }

        match lk.promote(rk).and_then(|kind| BinaryOp::arithmetic(op, kind)) {
            Some(specialized) => self.binary(specialized, lhs, rhs),
            None => {
                self.log.error(
                    RC0101,
                    format!("Operator '{}' is not defined for {} and {}", op.symbol(), lk, rk),
                );
                self.null(ResultKind::Object)
            }
        }
    }

    pub fn compare(&mut self, op: CompareOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Compare(op), lhs, rhs)
    }

    pub fn and(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.binary(BinaryOp::Or, lhs, rhs)
    }

    /// Arithmetic negation in the operand's kind
    pub fn negate(&mut self, operand: ExprId) -> ExprId {
        let kind = self.kind(operand);
        match UnaryOp::negate(kind) {
            Some(op) => self.alloc(Node::Unary { op, operand }),
            None => {
                self.log
                    .error(RC0101, format!("Operator '-' is not defined for {}", kind));
                self.null(ResultKind::Object)
            }
        }
    }

    pub fn not(&mut self, operand: ExprId) -> ExprId {
        self.alloc(Node::Unary { op: UnaryOp::Not, operand })
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Build an aggregate over `inner`, drawing a fresh cache key.
    pub fn aggregate(&mut self, func: AggregateFunc, inner: ExprId, scope: ScopeDescriptor) -> ExprId {
        let key = CacheKey::new(self.next_key);
        self.next_key += 1;
        let kind = func.result_kind(self.kind(inner));
        log::trace!("allocated cache key {} for {} over {}", key, func.name(), scope);
        self.alloc(Node::Aggregate {
            func,
            inner,
            scope,
            key,
            kind,
        })
    }

    pub fn max(&mut self, inner: ExprId, scope: ScopeDescriptor) -> ExprId {
        self.aggregate(AggregateFunc::Max, inner, scope)
    }

    pub fn stdevp(&mut self, inner: ExprId, scope: ScopeDescriptor) -> ExprId {
        self.aggregate(AggregateFunc::Stdevp, inner, scope)
    }

    /// Freeze the arena. The returned tree is immutable.
    pub fn finish(self) -> (ExprTree, ReportLog) {
        (ExprTree::new(self.nodes), self.log)
    }

    /// Number of nodes allocated so far, reachable or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
