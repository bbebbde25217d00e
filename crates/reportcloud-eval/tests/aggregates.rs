//! Aggregate function tests
//!
//! Tests for: Max, Stdevp, absent value mapping, scope resolution

mod common;

use common::{AMOUNT, EAST, WEST, column, sales};
use pretty_assertions::assert_eq;
use reportcloud_eval::{EmptyScope, EvalError, ExecutionInstance, ExprEngine, RowId};
use reportcloud_expr::{ExprBuilder, ExprId, FieldId, ScopeDescriptor};
use reportcloud_types::{Decimal, NaiveDateTime, ResultKind, Value};
use rstest::rstest;
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn stdevp_over(kind: ResultKind, scope: ScopeDescriptor) -> (ExprEngine, ExprId) {
    let mut b = ExprBuilder::new();
    let x = b.field(FieldId(0), kind);
    let agg = b.stdevp(x, scope);
    let (tree, _) = b.finish();
    (ExprEngine::new(Arc::new(tree)), agg)
}

fn max_over(kind: ResultKind, scope: ScopeDescriptor) -> (ExprEngine, ExprId) {
    let mut b = ExprBuilder::new();
    let x = b.field(FieldId(0), kind);
    let agg = b.max(x, scope);
    let (tree, _) = b.finish();
    (ExprEngine::new(Arc::new(tree)), agg)
}

fn ints(values: &[Option<i32>]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

// ============================================================================
// Stdevp
// ============================================================================

#[test]
fn test_stdevp_population() {
    let data = column(&ints(&[Some(2), Some(4), Some(4), Some(4), Some(5), Some(5), Some(7), Some(9)]));
    let (engine, agg) = stdevp_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    let value = engine.eval_float64(agg, &mut run, Some(RowId(0))).unwrap();
    assert!((value - 2.0).abs() < 1e-9, "got {}", value);
    assert_eq!(engine.kind(agg).unwrap(), ResultKind::Float64);
}

#[test]
fn test_stdevp_skips_nulls() {
    let data = column(&ints(&[Some(2), None, Some(4), Some(4), Some(4), Some(5), Some(5), None, Some(7), Some(9)]));
    let (engine, agg) = stdevp_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    let value = engine.eval_float64(agg, &mut run, None).unwrap();
    assert!((value - 2.0).abs() < 1e-9);
}

#[test]
fn test_stdevp_skips_non_numeric_text() {
    let data = column(&[Value::string("1"), Value::string("n/a"), Value::string("3")]);
    let (engine, agg) = stdevp_over(ResultKind::String, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    let value = engine.eval_float64(agg, &mut run, None).unwrap();
    assert!((value - 1.0).abs() < 1e-9);
}

#[rstest]
#[case(0.1)]
#[case(1e-3)]
#[case(123_456.789)]
fn test_stdevp_of_equal_values_is_zero(#[case] x: f64) {
    let data = column(&[Value::Float64(x), Value::Float64(x), Value::Float64(x)]);
    let (engine, agg) = stdevp_over(ResultKind::Float64, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.eval_float64(agg, &mut run, None).unwrap(), 0.0);
}

#[test]
fn test_stdevp_single_row_is_zero() {
    let data = column(&ints(&[Some(42)]));
    let (engine, agg) = stdevp_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.eval_float64(agg, &mut run, None).unwrap(), 0.0);
}

#[rstest]
#[case::empty(vec![])]
#[case::all_null(vec![Value::Null, Value::Null])]
fn test_stdevp_no_data_maps_to_absent(#[case] values: Vec<Value>) {
    let data = column(&values);
    let (engine, agg) = stdevp_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.evaluate(agg, &mut run, None).unwrap(), Value::Null);
    assert_eq!(engine.eval_int32(agg, &mut run, None).unwrap(), i32::MIN);
    assert_eq!(engine.eval_decimal(agg, &mut run, None).unwrap(), Decimal::MIN);
    assert_eq!(engine.eval_string(agg, &mut run, None).unwrap(), "");
    assert_eq!(engine.eval_datetime(agg, &mut run, None).unwrap(), NaiveDateTime::MIN);
    assert!(engine.eval_float64(agg, &mut run, None).unwrap().is_nan());
    assert!(!engine.eval_boolean(agg, &mut run, None).unwrap());
}

#[test]
fn test_stdevp_coercions() {
    let data = column(&ints(&[Some(2), Some(4), Some(4), Some(4), Some(5), Some(5), Some(7), Some(9)]));
    let (engine, agg) = stdevp_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.eval_int32(agg, &mut run, None).unwrap(), 2);
    assert_eq!(engine.eval_decimal(agg, &mut run, None).unwrap(), Decimal::from(2));
    assert_eq!(engine.eval_string(agg, &mut run, None).unwrap(), "2");
}

// ============================================================================
// Max
// ============================================================================

#[test]
fn test_max_skips_nulls() {
    let data = column(&ints(&[Some(3), None, Some(7), Some(2)]));
    let (engine, agg) = max_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.evaluate(agg, &mut run, None).unwrap(), Value::Int32(7));
    assert_eq!(engine.kind(agg).unwrap(), ResultKind::Int32);
}

#[rstest]
#[case::empty(vec![])]
#[case::all_null(vec![Value::Null, Value::Null, Value::Null])]
fn test_max_no_data_is_null(#[case] values: Vec<Value>) {
    let data = column(&values);
    let (engine, agg) = max_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.evaluate(agg, &mut run, None).unwrap(), Value::Null);
    assert_eq!(engine.eval_int32(agg, &mut run, None).unwrap(), i32::MIN);
}

#[test]
fn test_max_of_decimals_keeps_kind() {
    let data = column(&[
        Value::Decimal(Decimal::new(125, 2)),
        Value::Decimal(Decimal::new(1300, 3)),
        Value::Decimal(Decimal::new(12, 1)),
    ]);
    let (engine, agg) = max_over(ResultKind::Decimal, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.evaluate(agg, &mut run, None).unwrap(), Value::Decimal(Decimal::new(13, 1)));
}

#[test]
fn test_max_of_text() {
    let data = column(&[Value::string("pear"), Value::string("apple"), Value::string("quince")]);
    let (engine, agg) = max_over(ResultKind::String, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert_eq!(engine.eval_string(agg, &mut run, None).unwrap(), "quince");
}

#[test]
fn test_max_of_incomparable_objects_fails() {
    let data = column(&[Value::Int32(1), Value::string("a")]);
    let (engine, agg) = max_over(ResultKind::Object, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(data));

    assert!(matches!(
        engine.evaluate(agg, &mut run, None),
        Err(EvalError::NotComparable { .. })
    ));
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_group_scope_follows_current_row() {
    let mut b = ExprBuilder::new();
    let amount = b.field(AMOUNT, ResultKind::Int32);
    let agg = b.max(amount, ScopeDescriptor::Group { name: "ByRegion".into() });
    let (tree, _) = b.finish();
    let engine = ExprEngine::new(Arc::new(tree));

    let mut east = ExecutionInstance::new(Arc::new(sales()));
    let mut west = ExecutionInstance::new(Arc::new(sales()));
    assert_eq!(engine.evaluate(agg, &mut east, Some(EAST)).unwrap(), Value::Int32(5));
    assert_eq!(engine.evaluate(agg, &mut west, Some(WEST)).unwrap(), Value::Int32(7));
}

#[test]
fn test_dataset_scope_covers_every_row() {
    let mut b = ExprBuilder::new();
    let amount = b.field(AMOUNT, ResultKind::Int32);
    let agg = b.max(amount, ScopeDescriptor::DataSet { name: "sales".into() });
    let (tree, _) = b.finish();
    let engine = ExprEngine::new(Arc::new(tree));
    let mut run = ExecutionInstance::new(Arc::new(sales()));

    assert_eq!(engine.evaluate(agg, &mut run, Some(EAST)).unwrap(), Value::Int32(7));
}

#[test]
fn test_unresolved_scope_is_absent_and_not_cached() {
    let (engine, agg) = stdevp_over(ResultKind::Int32, ScopeDescriptor::Group { name: "Missing".into() });
    let mut run = ExecutionInstance::new(Arc::new(sales()));

    assert_eq!(engine.evaluate(agg, &mut run, Some(EAST)).unwrap(), Value::Null);
    assert!(run.cache().is_empty());
}

#[test]
fn test_evaluation_without_data() {
    let (engine, agg) = max_over(ResultKind::Int32, ScopeDescriptor::Default);
    let mut run = ExecutionInstance::new(Arc::new(EmptyScope));

    assert_eq!(engine.evaluate(agg, &mut run, None).unwrap(), Value::Null);
}
