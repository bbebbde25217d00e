//! Shared fixtures for evaluation tests

#![allow(dead_code)]

use reportcloud_eval::{DataScope, EvalResult, MemoryDataSet, ResolvedScope, RowId};
use reportcloud_expr::{FieldId, ScopeDescriptor};
use reportcloud_types::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Data scope that counts field reads, to observe row re-scans
#[derive(Debug)]
pub struct CountingScope {
    inner: MemoryDataSet,
    reads: AtomicUsize,
}

impl CountingScope {
    pub fn new(inner: MemoryDataSet) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl DataScope for CountingScope {
    fn resolve_scope(&self, scope: &ScopeDescriptor, row: Option<RowId>) -> Option<ResolvedScope> {
        self.inner.resolve_scope(scope, row)
    }

    fn field_value(&self, row: RowId, field: FieldId) -> EvalResult<Value> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.field_value(row, field)
    }
}

/// Single-column data set named `Data` with one row per value
pub fn column(values: &[Value]) -> MemoryDataSet {
    let mut ds = MemoryDataSet::new("Data", vec!["Value".into()]);
    for v in values {
        ds.push_row(vec![v.clone()]).unwrap();
    }
    ds
}

/// `Sales(Region, Amount)` grouped by region:
/// East = [3, 5, 1], West = [7, 2]
pub fn sales() -> MemoryDataSet {
    let rows = [("East", 3), ("East", 5), ("West", 7), ("East", 1), ("West", 2)];
    let mut ds = MemoryDataSet::new("Sales", vec!["Region".into(), "Amount".into()]);
    for (region, amount) in rows {
        ds.push_row(vec![Value::from(region), Value::Int32(amount)]).unwrap();
    }
    ds.group_by("ByRegion", vec![FieldId(0)])
}

pub const REGION: FieldId = FieldId(0);
pub const AMOUNT: FieldId = FieldId(1);
pub const EAST: RowId = RowId(0);
pub const WEST: RowId = RowId(2);
