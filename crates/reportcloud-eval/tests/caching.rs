//! Execution cache tests
//!
//! Covers memoization within one run, invalidation at scope boundaries,
//! isolation between runs sharing one tree, and uncacheable scopes.

mod common;

use common::{AMOUNT, CountingScope, EAST, WEST, column, sales};
use pretty_assertions::assert_eq;
use reportcloud_eval::{CacheSlot, EngineOptions, ExecutionInstance, ExprEngine, MemoryDataSet, RowId, ScopeBoundary};
use reportcloud_expr::{ArithOp, ExprBuilder, ExprId, ExprTree, FieldId, Node, ScopeDescriptor};
use reportcloud_types::{ResultKind, Value};
use std::sync::Arc;
use std::thread;

fn group_max() -> (Arc<ExprTree>, ExprId) {
    let mut b = ExprBuilder::new();
    let amount = b.field(AMOUNT, ResultKind::Int32);
    let agg = b.max(amount, ScopeDescriptor::Group { name: "ByRegion".into() });
    let (tree, _) = b.finish();
    (Arc::new(tree), agg)
}

fn key_of(tree: &ExprTree, id: ExprId) -> reportcloud_expr::CacheKey {
    match tree.node(id) {
        Node::Aggregate { key, .. } => *key,
        other => panic!("expected aggregate, got {:?}", other),
    }
}

// ============================================================================
// Memoization
// ============================================================================

#[test]
fn test_second_evaluation_does_not_rescan() {
    let (tree, agg) = group_max();
    let engine = ExprEngine::new(tree);
    let data = Arc::new(CountingScope::new(sales()));
    let mut run = ExecutionInstance::new(data.clone());

    let first = engine.evaluate(agg, &mut run, Some(EAST)).unwrap();
    let reads = data.reads();
    assert_eq!(reads, 3, "one read per row of the East group");

    let second = engine.evaluate(agg, &mut run, Some(EAST)).unwrap();
    let from_sibling = engine.evaluate(agg, &mut run, Some(RowId(3))).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, from_sibling);
    assert_eq!(data.reads(), reads);
    assert_eq!(run.stats().hits, 2);
}

#[test]
fn test_cached_null_is_returned() {
    let data = Arc::new(CountingScope::new(column(&[Value::Null, Value::Null])));
    let mut b = ExprBuilder::new();
    let x = b.field(FieldId(0), ResultKind::Int32);
    let agg = b.max(x, ScopeDescriptor::Default);
    let (tree, _) = b.finish();
    let engine = ExprEngine::new(Arc::new(tree));
    let mut run = ExecutionInstance::new(data.clone());

    assert_eq!(engine.evaluate(agg, &mut run, None).unwrap(), Value::Null);
    assert_eq!(engine.evaluate(agg, &mut run, None).unwrap(), Value::Null);
    assert_eq!(data.reads(), 2);
}

#[test]
fn test_identical_aggregates_have_separate_slots() {
    let mut b = ExprBuilder::new();
    let a = b.field(AMOUNT, ResultKind::Int32);
    let first = b.max(a, ScopeDescriptor::Default);
    let second = b.max(a, ScopeDescriptor::Default);
    let (tree, _) = b.finish();
    let tree = Arc::new(tree);
    let engine = ExprEngine::new(tree.clone());
    let data = Arc::new(CountingScope::new(sales()));
    let mut run = ExecutionInstance::new(data.clone());

    engine.evaluate(first, &mut run, Some(EAST)).unwrap();
    engine.evaluate(second, &mut run, Some(EAST)).unwrap();

    assert_eq!(data.reads(), 6);
    assert_eq!(run.cache().len(), 2);
    assert_ne!(key_of(&tree, first), key_of(&tree, second));
}

#[test]
fn test_caching_can_be_disabled() {
    let (tree, agg) = group_max();
    let engine = ExprEngine::with_options(tree, EngineOptions::default().with_cache_aggregates(false));
    let data = Arc::new(CountingScope::new(sales()));
    let mut run = ExecutionInstance::new(data.clone());

    engine.evaluate(agg, &mut run, Some(EAST)).unwrap();
    engine.evaluate(agg, &mut run, Some(EAST)).unwrap();
    assert_eq!(data.reads(), 6);
    assert!(run.cache().is_empty());
}

#[test]
fn test_cell_scope_is_recomputed() {
    let mut ds = MemoryDataSet::new("Sales", vec!["Region".into(), "Amount".into(), "Quarter".into()]);
    for (region, amount, quarter) in [("East", 3, "Q1"), ("East", 5, "Q2"), ("East", 4, "Q1")] {
        ds.push_row(vec![Value::from(region), Value::Int32(amount), Value::from(quarter)])
            .unwrap();
    }
    let ds = ds.group_by("ByRegion", vec![FieldId(0)]).group_by("ByQuarter", vec![FieldId(2)]);

    let mut b = ExprBuilder::new();
    let amount = b.field(AMOUNT, ResultKind::Int32);
    let cell = ScopeDescriptor::Cell {
        row_group: "ByRegion".into(),
        column_group: "ByQuarter".into(),
    };
    let agg = b.max(amount, cell);
    let (tree, _) = b.finish();
    let engine = ExprEngine::new(Arc::new(tree));
    let mut run = ExecutionInstance::new(Arc::new(ds));

    assert_eq!(engine.evaluate(agg, &mut run, Some(RowId(0))).unwrap(), Value::Int32(4));
    assert_eq!(engine.evaluate(agg, &mut run, Some(RowId(1))).unwrap(), Value::Int32(5));
    assert!(run.cache().is_empty());
}

// ============================================================================
// Invalidation
// ============================================================================

#[test]
fn test_stale_value_until_boundary_is_crossed() {
    let (tree, agg) = group_max();
    let boundary = ScopeBoundary::for_roots("ByRegion", &tree, &[agg]);
    let engine = ExprEngine::new(tree);
    let data = Arc::new(CountingScope::new(sales()));
    let mut run = ExecutionInstance::new(data.clone());

    assert_eq!(engine.evaluate(agg, &mut run, Some(EAST)).unwrap(), Value::Int32(5));
    // Moving to the next group without crossing keeps the East result
    assert_eq!(engine.evaluate(agg, &mut run, Some(WEST)).unwrap(), Value::Int32(5));

    run.cross(&boundary);
    assert_eq!(engine.evaluate(agg, &mut run, Some(WEST)).unwrap(), Value::Int32(7));
    assert_eq!(data.reads(), 3 + 2);
}

#[test]
fn test_invalidate_forces_rescan() {
    let (tree, agg) = group_max();
    let key = key_of(&tree, agg);
    let engine = ExprEngine::new(tree);
    let data = Arc::new(CountingScope::new(sales()));
    let mut run = ExecutionInstance::new(data.clone());

    engine.evaluate(agg, &mut run, Some(EAST)).unwrap();
    assert_eq!(run.invalidate(key), Some(Value::Int32(5)));
    assert_eq!(run.invalidate(key), None);

    assert_eq!(engine.evaluate(agg, &mut run, Some(EAST)).unwrap(), Value::Int32(5));
    assert_eq!(data.reads(), 6);
}

#[test]
fn test_boundary_only_drops_its_own_keys() {
    let mut b = ExprBuilder::new();
    let amount = b.field(AMOUNT, ResultKind::Int32);
    let per_group = b.max(amount, ScopeDescriptor::Group { name: "ByRegion".into() });
    let overall = b.max(amount, ScopeDescriptor::DataSet { name: "Sales".into() });
    let (tree, _) = b.finish();
    let boundary = ScopeBoundary::for_roots("ByRegion", &tree, &[per_group]);
    let engine = ExprEngine::new(Arc::new(tree));
    let mut run = ExecutionInstance::new(Arc::new(sales()));

    engine.evaluate(per_group, &mut run, Some(EAST)).unwrap();
    engine.evaluate(overall, &mut run, Some(EAST)).unwrap();
    run.cross(&boundary);

    assert_eq!(run.cache().len(), 1);
    assert_eq!(boundary.keys().len(), 1);
}

#[test]
fn test_work_state_survives_aggregate_invalidation() {
    let (tree, agg) = group_max();
    let boundary = ScopeBoundary::whole("report", &tree);
    let engine = ExprEngine::new(tree);
    let mut run = ExecutionInstance::new(Arc::new(sales()));

    run.set_work_state("Column2", "wc", Value::Float64(72.0));
    engine.evaluate(agg, &mut run, Some(EAST)).unwrap();
    run.cross(&boundary);

    assert_eq!(run.work_state("Column2", "wc"), Some(&Value::Float64(72.0)));
    assert!(!run.cache().contains(&CacheSlot::Aggregate(boundary.keys()[0])));
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn test_runs_do_not_share_cached_values() {
    let (tree, agg) = group_max();
    let engine = ExprEngine::new(tree);

    let mut other = MemoryDataSet::new("Sales", vec!["Region".into(), "Amount".into()]);
    other.push_row(vec![Value::from("East"), Value::Int32(100)]).unwrap();
    let other = other.group_by("ByRegion", vec![FieldId(0)]);

    let mut first = ExecutionInstance::new(Arc::new(sales()));
    let mut second = ExecutionInstance::new(Arc::new(other));

    assert_eq!(engine.evaluate(agg, &mut first, Some(EAST)).unwrap(), Value::Int32(5));
    assert_eq!(engine.evaluate(agg, &mut second, Some(EAST)).unwrap(), Value::Int32(100));
    assert_eq!(engine.evaluate(agg, &mut first, Some(EAST)).unwrap(), Value::Int32(5));
}

#[test]
fn test_instance_serves_one_tree() {
    let (tree, agg) = group_max();
    let engine = ExprEngine::new(tree);
    let (other_tree, other_agg) = group_max();
    let other = ExprEngine::new(other_tree);
    assert_eq!(key_of(engine.tree(), agg), key_of(other.tree(), other_agg));

    let mut run = ExecutionInstance::new(Arc::new(sales()));
    assert_eq!(engine.evaluate(agg, &mut run, Some(EAST)).unwrap(), Value::Int32(5));
    assert_eq!(run.tree(), Some(engine.tree().id()));

    // Same key, different tree: the cached East maximum must not leak
    let err = other.evaluate(other_agg, &mut run, Some(WEST)).unwrap_err();
    assert!(matches!(err, reportcloud_eval::EvalError::Internal { .. }), "{:?}", err);

    // Clones of an engine share the tree
    let clone = engine.clone();
    assert_eq!(clone.evaluate(agg, &mut run, Some(EAST)).unwrap(), Value::Int32(5));

    run.reset();
    assert_eq!(other.evaluate(other_agg, &mut run, Some(WEST)).unwrap(), Value::Int32(7));
    assert_eq!(run.tree(), Some(other.tree().id()));
}

#[test]
fn test_concurrent_runs_over_one_tree() {
    let mut b = ExprBuilder::new();
    let amount = b.field(FieldId(0), ResultKind::Int32);
    let ten = b.literal(Value::Int32(10));
    let shifted = b.arithmetic(ArithOp::Minus, amount, ten);
    let agg = b.max(shifted, ScopeDescriptor::Default);
    let root = b.optimize(agg);
    let (tree, _) = b.finish();
    let engine = ExprEngine::new(Arc::new(tree));

    let results: Vec<Value> = thread::scope(|s| {
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let engine = engine.clone();
                s.spawn(move || {
                    let values: Vec<Value> = (0..n).map(|i| Value::Int32(i * 10)).collect();
                    let mut run = ExecutionInstance::new(Arc::new(column(&values)));
                    engine.evaluate(root, &mut run, None).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results, vec![Value::Int32(-10), Value::Int32(0), Value::Int32(10), Value::Int32(20)]);
}
