//! Table columns

use crate::definition::ColumnDefinition;
use crate::fields::Fields;
use crate::visibility::{self, Visibility};
use reportcloud_diagnostics::RC0003;
use reportcloud_eval::{EvalResult, ExecutionInstance, ExprEngine, RowId};
use reportcloud_expr::{ExprBuilder, ExprId};
use reportcloud_types::{ResultKind, Value};

/// Name of the per-run work state a column keeps in the execution cache
const WORK_STATE: &str = "wc";

/// A table column with its expressions built
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    name: String,
    /// Owner of this column's work state; unique within a report
    owner: String,
    width: f64,
    value: ExprId,
    footer: Option<ExprId>,
    visibility: Option<Visibility>,
    fixed_header: bool,
}

impl TableColumn {
    /// Build the column at `index` of a definition
    pub fn build(
        index: usize,
        definition: &ColumnDefinition,
        builder: &mut ExprBuilder,
        fields: &Fields,
    ) -> Self {
        let width = definition.width.unwrap_or_else(|| {
            builder
                .log_mut()
                .log_error(8, RC0003, "TableColumn requires the Width element.");
            0.0
        });
        let value = definition.value.as_ref().map(|e| e.build(builder, fields));
        let value = builder.require(value, "TableColumn", "Value", ResultKind::String);
        let footer = definition.footer.as_ref().map(|e| e.build(builder, fields));
        let visibility = definition
            .hidden
            .as_ref()
            .map(|e| Visibility::new(e.build(builder, fields)));
        let fixed_header = definition
            .fixed_header
            .as_ref()
            .is_some_and(|flag| flag.resolve(builder.log_mut()));

        Self {
            name: definition.name.clone(),
            owner: format!("TableColumn/{}", index),
            width,
            value,
            footer,
            visibility,
            fixed_header,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn value(&self) -> ExprId {
        self.value
    }

    pub fn footer(&self) -> Option<ExprId> {
        self.footer
    }

    pub fn visibility(&self) -> Option<&Visibility> {
        self.visibility.as_ref()
    }

    pub fn fixed_header(&self) -> bool {
        self.fixed_header
    }

    /// Every expression root of this column
    pub fn roots(&self) -> Vec<ExprId> {
        let mut roots = vec![self.value];
        roots.extend(self.footer);
        roots.extend(self.visibility.map(|v| v.hidden()));
        roots
    }

    /// Fold the column's expressions in place
    pub fn optimize(&mut self, builder: &mut ExprBuilder) {
        self.value = builder.optimize(self.value);
        self.footer = self.footer.map(|id| builder.optimize(id));
        if let Some(visibility) = self.visibility.as_mut() {
            visibility.optimize(builder);
        }
    }

    pub fn is_hidden(
        &self,
        engine: &ExprEngine,
        instance: &mut ExecutionInstance,
        row: Option<RowId>,
    ) -> EvalResult<bool> {
        visibility::is_hidden(self.visibility.as_ref(), engine, instance, row)
    }

    /// Left edge of the column in the current run; 0 until laid out
    pub fn x_position(&self, instance: &ExecutionInstance) -> f64 {
        instance
            .work_state(&self.owner, WORK_STATE)
            .and_then(|v| v.to_float64().ok())
            .filter(|x| !x.is_nan())
            .unwrap_or(0.0)
    }

    pub fn set_x_position(&self, instance: &mut ExecutionInstance, x: f64) {
        instance.set_work_state(&self.owner, WORK_STATE, Value::Float64(x));
    }
}
