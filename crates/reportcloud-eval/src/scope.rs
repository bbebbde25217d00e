//! Data scope resolution

use crate::error::EvalResult;
use reportcloud_expr::{FieldId, ScopeDescriptor};
use reportcloud_types::Value;
use std::fmt;

/// Opaque handle to one row of the data being reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub usize);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.0)
    }
}

/// Rows an aggregate reduces over, for one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    /// Rows in data order
    pub rows: Vec<RowId>,
    /// Whether the result may be memoized for the rest of this scope
    /// instance. False when the extent depends on more than the current row.
    pub cacheable: bool,
}

impl ResolvedScope {
    pub fn cacheable(rows: Vec<RowId>) -> Self {
        Self { rows, cacheable: true }
    }

    pub fn uncacheable(rows: Vec<RowId>) -> Self {
        Self { rows, cacheable: false }
    }
}

/// Row and field access the evaluator needs from the data layer.
///
/// Implementations hold already materialized data; neither method may block.
pub trait DataScope: Send + Sync {
    /// Rows `scope` covers as seen from `row`. `None` when the descriptor
    /// does not resolve in this context (unknown name, or a group scope
    /// asked for outside of any row).
    fn resolve_scope(&self, scope: &ScopeDescriptor, row: Option<RowId>) -> Option<ResolvedScope>;

    /// Raw value of `field` in `row`
    fn field_value(&self, row: RowId, field: FieldId) -> EvalResult<Value>;
}

/// A scope with no rows, for expressions evaluated outside of any data
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScope;

impl DataScope for EmptyScope {
    fn resolve_scope(&self, _scope: &ScopeDescriptor, _row: Option<RowId>) -> Option<ResolvedScope> {
        None
    }

    fn field_value(&self, _row: RowId, field: FieldId) -> EvalResult<Value> {
        Err(crate::EvalError::field_not_found(field))
    }
}
