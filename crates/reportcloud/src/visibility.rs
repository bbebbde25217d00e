//! Conditional visibility of report items

use reportcloud_eval::{EvalResult, ExecutionInstance, ExprEngine, RowId};
use reportcloud_expr::{ExprBuilder, ExprId};

/// A hidden predicate, evaluated through the boolean entry point.
///
/// A null predicate result reads as `false`, so the item stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    hidden: ExprId,
}

impl Visibility {
    pub fn new(hidden: ExprId) -> Self {
        Self { hidden }
    }

    pub fn hidden(&self) -> ExprId {
        self.hidden
    }

    pub fn is_hidden(
        &self,
        engine: &ExprEngine,
        instance: &mut ExecutionInstance,
        row: Option<RowId>,
    ) -> EvalResult<bool> {
        engine.eval_boolean(self.hidden, instance, row)
    }

    pub(crate) fn optimize(&mut self, builder: &mut ExprBuilder) {
        self.hidden = builder.optimize(self.hidden);
    }
}

/// Whether an item with optional visibility is hidden; no predicate means
/// visible.
pub fn is_hidden(
    visibility: Option<&Visibility>,
    engine: &ExprEngine,
    instance: &mut ExecutionInstance,
    row: Option<RowId>,
) -> EvalResult<bool> {
    match visibility {
        Some(v) => v.is_hidden(engine, instance, row),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportcloud_eval::EmptyScope;
    use reportcloud_expr::CompareOp;
    use reportcloud_types::{ResultKind, Value};
    use std::sync::Arc;

    fn engine_with(build: impl FnOnce(&mut ExprBuilder) -> ExprId) -> (ExprEngine, ExprId) {
        let mut builder = ExprBuilder::new();
        let id = build(&mut builder);
        let (tree, _) = builder.finish();
        (ExprEngine::new(Arc::new(tree)), id)
    }

    #[test]
    fn test_predicate_decides() {
        let (engine, id) = engine_with(|b| {
            let one = b.literal(Value::Int32(1));
            let two = b.literal(Value::Int32(2));
            b.compare(CompareOp::Lt, one, two)
        });
        let mut instance = ExecutionInstance::new(Arc::new(EmptyScope));
        let visibility = Visibility::new(id);
        assert!(visibility.is_hidden(&engine, &mut instance, None).unwrap());
    }

    #[test]
    fn test_null_predicate_is_visible() {
        let (engine, id) = engine_with(|b| b.null(ResultKind::Boolean));
        let mut instance = ExecutionInstance::new(Arc::new(EmptyScope));
        assert!(!is_hidden(Some(&Visibility::new(id)), &engine, &mut instance, None).unwrap());
        assert!(!is_hidden(None, &engine, &mut instance, None).unwrap());
    }
}
