//! In-memory data set with groupings

use crate::error::{EvalError, EvalResult};
use crate::scope::{DataScope, ResolvedScope, RowId};
use indexmap::IndexMap;
use reportcloud_expr::{FieldId, ScopeDescriptor};
use reportcloud_types::Value;

/// Partition of the rows by the values of a set of key fields
#[derive(Debug, Clone)]
struct Grouping {
    fields: Vec<FieldId>,
    /// Key values of each instance, in order of first appearance
    keys: Vec<Vec<Value>>,
    /// Rows of each instance
    instances: Vec<Vec<RowId>>,
    /// Instance index of every row
    assignment: Vec<usize>,
}

impl Grouping {
    fn new(fields: Vec<FieldId>) -> Self {
        Self {
            fields,
            keys: Vec::new(),
            instances: Vec::new(),
            assignment: Vec::new(),
        }
    }

    fn assign(&mut self, row: RowId, values: &[Value]) {
        let key: Vec<Value> = self
            .fields
            .iter()
            .map(|f| values.get(f.index()).cloned().unwrap_or(Value::Null))
            .collect();
        let index = match self.keys.iter().position(|k| *k == key) {
            Some(index) => index,
            None => {
                self.keys.push(key);
                self.instances.push(Vec::new());
                self.keys.len() - 1
            }
        };
        self.instances[index].push(row);
        self.assignment.push(index);
    }

    fn rows_of(&self, row: RowId) -> Option<&[RowId]> {
        let index = *self.assignment.get(row.0)?;
        self.instances.get(index).map(Vec::as_slice)
    }
}

/// A single named data set held in memory.
///
/// Groupings are declared outermost first; the last one is the innermost
/// group the default scope resolves to.
#[derive(Debug, Clone)]
pub struct MemoryDataSet {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    groupings: IndexMap<String, Grouping>,
}

impl MemoryDataSet {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            groupings: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column number of `name`, ignoring case
    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .map(|i| FieldId(i as u32))
    }

    /// Append a row. Missing trailing values read as null.
    pub fn push_row(&mut self, values: Vec<Value>) -> EvalResult<RowId> {
        if values.len() > self.columns.len() {
            return Err(EvalError::internal(format!(
                "row has {} values but data set '{}' has {} columns",
                values.len(),
                self.name,
                self.columns.len()
            )));
        }
        let row = RowId(self.rows.len());
        for grouping in self.groupings.values_mut() {
            grouping.assign(row, &values);
        }
        self.rows.push(values);
        Ok(row)
    }

    pub fn with_row(mut self, values: Vec<Value>) -> EvalResult<Self> {
        self.push_row(values)?;
        Ok(self)
    }

    /// Declare a grouping nested inside the ones already declared.
    ///
    /// Rows fall into the same instance when all `fields` are equal and they
    /// share an instance of every enclosing grouping.
    pub fn group_by(mut self, name: impl Into<String>, fields: Vec<FieldId>) -> Self {
        let mut key = self
            .groupings
            .values()
            .last()
            .map(|enclosing| enclosing.fields.clone())
            .unwrap_or_default();
        key.extend(fields);
        let mut grouping = Grouping::new(key);
        for (index, values) in self.rows.iter().enumerate() {
            grouping.assign(RowId(index), values);
        }
        self.groupings.insert(name.into(), grouping);
        self
    }

    /// Every row, in data order
    pub fn all_rows(&self) -> Vec<RowId> {
        (0..self.rows.len()).map(RowId).collect()
    }

    /// Instances of a grouping, each one a list of rows in data order
    pub fn group_instances(&self, name: &str) -> Option<&[Vec<RowId>]> {
        self.grouping(name).map(|g| g.instances.as_slice())
    }

    /// Index of the innermost group instance holding `row`, if any grouping
    /// is declared
    pub fn innermost_instance(&self, row: RowId) -> Option<usize> {
        let grouping = self.groupings.values().last()?;
        grouping.assignment.get(row.0).copied()
    }

    /// Names of the declared groupings, outermost first
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groupings.keys().map(String::as_str)
    }

    fn grouping(&self, name: &str) -> Option<&Grouping> {
        self.groupings
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, g)| g)
    }

    fn group_rows(&self, name: &str, row: RowId) -> Option<Vec<RowId>> {
        self.grouping(name)?.rows_of(row).map(<[RowId]>::to_vec)
    }
}

impl DataScope for MemoryDataSet {
    fn resolve_scope(&self, scope: &ScopeDescriptor, row: Option<RowId>) -> Option<ResolvedScope> {
        match scope {
            ScopeDescriptor::Default => {
                let innermost = self.groupings.values().last();
                match (row, innermost) {
                    (Some(row), Some(grouping)) => {
                        grouping.rows_of(row).map(|rows| ResolvedScope::cacheable(rows.to_vec()))
                    }
                    _ => Some(ResolvedScope::cacheable(self.all_rows())),
                }
            }
            ScopeDescriptor::DataSet { name } => self
                .name
                .eq_ignore_ascii_case(name)
                .then(|| ResolvedScope::cacheable(self.all_rows())),
            ScopeDescriptor::Group { name } => {
                self.group_rows(name, row?).map(ResolvedScope::cacheable)
            }
            ScopeDescriptor::Cell {
                row_group,
                column_group,
            } => {
                let row = row?;
                let across = self.group_rows(row_group, row)?;
                let down = self.group_rows(column_group, row)?;
                let rows = across.into_iter().filter(|r| down.contains(r)).collect();
                Some(ResolvedScope::uncacheable(rows))
            }
        }
    }

    fn field_value(&self, row: RowId, field: FieldId) -> EvalResult<Value> {
        let values = self
            .rows
            .get(row.0)
            .ok_or_else(|| EvalError::internal(format!("{} is not in data set '{}'", row, self.name)))?;
        if field.index() >= self.columns.len() {
            return Err(EvalError::field_not_found(field));
        }
        Ok(values.get(field.index()).cloned().unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales() -> MemoryDataSet {
        let rows = [("East", "Q1", 3), ("East", "Q2", 5), ("West", "Q1", 7), ("East", "Q1", 1)];
        let mut ds = MemoryDataSet::new("Sales", vec!["Region".into(), "Quarter".into(), "Amount".into()]);
        for (region, quarter, amount) in rows {
            ds.push_row(vec![Value::from(region), Value::from(quarter), Value::Int32(amount)])
                .unwrap();
        }
        ds.group_by("ByRegion", vec![FieldId(0)])
            .group_by("ByQuarter", vec![FieldId(1)])
    }

    #[test]
    fn test_group_scope_follows_row() {
        let ds = sales();
        let group = ScopeDescriptor::Group { name: "byregion".into() };
        assert_eq!(
            ds.resolve_scope(&group, Some(RowId(0))).unwrap().rows,
            vec![RowId(0), RowId(1), RowId(3)]
        );
        assert_eq!(ds.resolve_scope(&group, Some(RowId(2))).unwrap().rows, vec![RowId(2)]);
        assert!(ds.resolve_scope(&group, None).is_none());
    }

    #[test]
    fn test_default_scope_is_innermost_group() {
        let ds = sales();
        let scope = ds.resolve_scope(&ScopeDescriptor::Default, Some(RowId(3))).unwrap();
        assert_eq!(scope.rows, vec![RowId(0), RowId(3)]);
        let outside = ds.resolve_scope(&ScopeDescriptor::Default, None).unwrap();
        assert_eq!(outside.rows.len(), 4);
    }

    #[test]
    fn test_nested_group_stays_inside_its_parent() {
        let ds = sales();
        // West/Q1 shares a quarter with the East/Q1 rows but not a region
        let west = ds.resolve_scope(&ScopeDescriptor::Default, Some(RowId(2))).unwrap();
        assert_eq!(west.rows, vec![RowId(2)]);

        let quarters = ds.group_instances("ByQuarter").unwrap();
        assert_eq!(
            quarters.to_vec(),
            vec![vec![RowId(0), RowId(3)], vec![RowId(1)], vec![RowId(2)]]
        );
        assert_eq!(ds.innermost_instance(RowId(3)), Some(0));
        assert_eq!(ds.innermost_instance(RowId(2)), Some(2));
    }

    #[test]
    fn test_rows_pushed_after_nesting_follow_the_parent() {
        let mut ds = MemoryDataSet::new("Sales", vec!["Region".into(), "Quarter".into()])
            .group_by("ByRegion", vec![FieldId(0)])
            .group_by("ByQuarter", vec![FieldId(1)]);
        for (region, quarter) in [("East", "Q1"), ("West", "Q1"), ("East", "Q1")] {
            ds.push_row(vec![Value::from(region), Value::from(quarter)]).unwrap();
        }
        let scope = ds.resolve_scope(&ScopeDescriptor::Default, Some(RowId(0))).unwrap();
        assert_eq!(scope.rows, vec![RowId(0), RowId(2)]);
        assert_eq!(MemoryDataSet::new("Empty", vec![]).innermost_instance(RowId(0)), None);
    }

    #[test]
    fn test_cell_scope_is_not_cacheable() {
        let ds = sales();
        let cell = ScopeDescriptor::Cell {
            row_group: "ByRegion".into(),
            column_group: "ByQuarter".into(),
        };
        let scope = ds.resolve_scope(&cell, Some(RowId(0))).unwrap();
        assert_eq!(scope.rows, vec![RowId(0), RowId(3)]);
        assert!(!scope.cacheable);
    }

    #[test]
    fn test_unknown_dataset_does_not_resolve() {
        let ds = sales();
        let scope = ScopeDescriptor::DataSet { name: "Orders".into() };
        assert!(ds.resolve_scope(&scope, None).is_none());
    }

    #[test]
    fn test_field_lookup() {
        let ds = sales();
        assert_eq!(ds.field_value(RowId(2), FieldId(2)).unwrap(), Value::Int32(7));
        assert!(matches!(
            ds.field_value(RowId(0), FieldId(9)),
            Err(EvalError::FieldNotFound { .. })
        ));
        assert_eq!(ds.field_id("amount"), Some(FieldId(2)));
    }
}
