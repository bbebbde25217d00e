//! Compiled reports and report runs

use crate::definition::{GroupingDefinition, ReportDefinition};
use crate::error::{ReportError, ReportResult};
use crate::fields::Fields;
use crate::json::{from_value, load_rows};
use crate::table::TableColumn;
use indexmap::IndexMap;
use reportcloud_diagnostics::{RC0005, RC0008, ReportLog};
use reportcloud_eval::{
    CacheStats, EngineOptions, ExecutionInstance, ExprEngine, MemoryDataSet, RowId, ScopeBoundary,
};
use reportcloud_expr::{ExprBuilder, ExprId, FieldId};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A report definition with every expression built, folded and frozen.
///
/// Compiling never fails: problems in the definition are collected in
/// [`Report::log`] and the affected parts evaluate to null. One compiled
/// report can be run any number of times, each run with its own
/// [`ExecutionInstance`].
#[derive(Debug, Clone)]
pub struct Report {
    name: String,
    dataset: String,
    fields: Fields,
    groupings: Vec<(String, Vec<FieldId>)>,
    group: Option<String>,
    columns: Vec<TableColumn>,
    rows: Vec<JsonValue>,
    engine: ExprEngine,
    log: ReportLog,
}

/// Result of one report run
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub name: String,
    pub groups: Vec<GroupOutput>,
    pub stats: CacheStats,
}

/// Output for one group instance
#[derive(Debug, Clone, Serialize)]
pub struct GroupOutput {
    /// Visible columns and their laid out positions
    pub columns: Vec<ColumnLayout>,
    pub rows: Vec<IndexMap<String, JsonValue>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub footer: IndexMap<String, JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnLayout {
    pub name: String,
    pub x: f64,
}

impl Report {
    /// Compile with the definition's own options
    pub fn compile(definition: ReportDefinition) -> Self {
        let options = definition.options;
        Self::compile_with(definition, options)
    }

    /// Compile with explicit engine options
    pub fn compile_with(definition: ReportDefinition, options: EngineOptions) -> Self {
        let mut log = ReportLog::new();
        let fields = Fields::load(&definition.dataset.fields, &mut log);
        let groupings = resolve_groupings(&definition.dataset.groupings, &fields, &mut log);

        if let Some(group) = &definition.group {
            if !groupings.iter().any(|(name, _)| name.eq_ignore_ascii_case(group)) {
                log.log_error(8, RC0008, format!("Report groups by unknown grouping '{}'.", group));
            }
        }

        let mut builder = ExprBuilder::new();
        let mut columns: Vec<TableColumn> = definition
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| TableColumn::build(index, column, &mut builder, &fields))
            .collect();
        if options.constant_folding {
            for column in &mut columns {
                column.optimize(&mut builder);
            }
        }
        let (tree, mut build_log) = builder.finish();
        log.append(&mut build_log);

        log::debug!(
            "Compiled report '{}': {} columns, {} nodes, {} aggregates",
            definition.name,
            columns.len(),
            tree.len(),
            tree.cache_keys().count()
        );

        Self {
            name: definition.name,
            dataset: definition.dataset.name,
            fields,
            groupings,
            group: definition.group,
            columns,
            rows: definition.rows,
            engine: ExprEngine::with_options(Arc::new(tree), options),
            log,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Diagnostics raised while compiling
    pub fn log(&self) -> &ReportLog {
        &self.log
    }

    pub fn engine(&self) -> &ExprEngine {
        &self.engine
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// Every expression root of the report
    pub fn roots(&self) -> Vec<ExprId> {
        self.columns.iter().flat_map(TableColumn::roots).collect()
    }

    /// Build the in-memory data set for `rows`
    pub fn dataset(&self, rows: &[JsonValue]) -> ReportResult<MemoryDataSet> {
        let mut data = MemoryDataSet::new(&self.dataset, self.fields.column_names().to_vec());
        for (name, fields) in &self.groupings {
            data = data.group_by(name.clone(), fields.clone());
        }
        for values in load_rows(&self.fields, rows)? {
            data.push_row(values)?;
        }
        Ok(data)
    }

    /// Run over the rows embedded in the definition
    pub fn run_embedded(&self) -> ReportResult<ReportOutput> {
        self.run_rows(&self.rows)
    }

    /// Run over JSON rows
    pub fn run_rows(&self, rows: &[JsonValue]) -> ReportResult<ReportOutput> {
        self.run(Arc::new(self.dataset(rows)?))
    }

    /// Run over a data set, one group instance after another.
    ///
    /// Aggregate results are cached for the length of the innermost group
    /// instance the evaluated rows belong to, and dropped whenever the run
    /// moves into another one.
    pub fn run(&self, data: Arc<MemoryDataSet>) -> ReportResult<ReportOutput> {
        let instances: Vec<Vec<RowId>> = match &self.group {
            Some(name) => data
                .group_instances(name)
                .ok_or_else(|| ReportError::UnknownGroup(name.clone()))?
                .to_vec(),
            None => vec![data.all_rows()],
        };
        let boundary_name = self.group.clone().unwrap_or_else(|| self.dataset.clone());
        let mut cursor = GroupCursor {
            data: &data,
            boundary: ScopeBoundary::for_roots(boundary_name, self.engine.tree(), &self.roots()),
            current: None,
        };

        let mut instance = ExecutionInstance::new(data.clone());
        let mut groups = Vec::with_capacity(instances.len());
        for (index, rows) in instances.iter().enumerate() {
            groups.push(self.run_group(&mut instance, &mut cursor, index, rows)?);
        }

        Ok(ReportOutput {
            name: self.name.clone(),
            groups,
            stats: instance.stats(),
        })
    }

    fn run_group(
        &self,
        instance: &mut ExecutionInstance,
        cursor: &mut GroupCursor<'_>,
        group: usize,
        rows: &[RowId],
    ) -> ReportResult<GroupOutput> {
        let first = rows.first().copied();
        cursor.enter(instance, group, first);

        let mut visible = Vec::new();
        let mut x = 0.0;
        for column in &self.columns {
            if column.is_hidden(&self.engine, instance, first)? {
                continue;
            }
            column.set_x_position(instance, x);
            x += column.width();
            visible.push(column);
        }
        let columns = visible
            .iter()
            .map(|c| ColumnLayout {
                name: c.name().to_string(),
                x: c.x_position(instance),
            })
            .collect();

        let mut output_rows = Vec::with_capacity(rows.len());
        for &row in rows {
            cursor.enter(instance, group, Some(row));
            let mut values = IndexMap::new();
            for column in &visible {
                let value = self.engine.evaluate(column.value(), instance, Some(row))?;
                values.insert(column.name().to_string(), from_value(&value));
            }
            output_rows.push(values);
        }

        cursor.enter(instance, group, first);
        let mut footer = IndexMap::new();
        for column in &visible {
            if let Some(id) = column.footer() {
                let value = self.engine.evaluate(id, instance, first)?;
                footer.insert(column.name().to_string(), from_value(&value));
            }
        }

        Ok(GroupOutput {
            columns,
            rows: output_rows,
            footer,
        })
    }
}

/// Where a run is: the run group and the innermost group instance of the
/// row being evaluated.
struct GroupCursor<'a> {
    data: &'a MemoryDataSet,
    boundary: ScopeBoundary,
    current: Option<(usize, Option<usize>)>,
}

impl GroupCursor<'_> {
    /// Move to `row` of run group `group`, crossing the boundary when either
    /// instance changes
    fn enter(&mut self, instance: &mut ExecutionInstance, group: usize, row: Option<RowId>) {
        let position = (group, row.and_then(|row| self.data.innermost_instance(row)));
        if self.current.is_some_and(|current| current != position) {
            instance.cross(&self.boundary);
        }
        self.current = Some(position);
    }
}

fn resolve_groupings(
    groupings: &[GroupingDefinition],
    fields: &Fields,
    log: &mut ReportLog,
) -> Vec<(String, Vec<FieldId>)> {
    groupings
        .iter()
        .map(|grouping| {
            let keys = grouping
                .fields
                .iter()
                .filter_map(|name| match fields.get(name) {
                    Some(field) => Some(field.column),
                    None => {
                        log.log_error(
                            8,
                            RC0005,
                            format!("Grouping {} uses unknown field '{}'.", grouping.name, name),
                        );
                        None
                    }
                })
                .collect();
            (grouping.name.clone(), keys)
        })
        .collect()
}
