//! JSON report definitions
//!
//! A definition names a data set (its fields and groupings), the table
//! columns to compute and optionally the rows to run over:
//!
//! ```json
//! {
//!   "name": "Sales",
//!   "dataset": {
//!     "name": "Sales",
//!     "fields": [{ "name": "Region", "type": "string" }, { "name": "Amount", "type": "int32" }],
//!     "groupings": [{ "name": "ByRegion", "fields": ["Region"] }]
//!   },
//!   "group": "ByRegion",
//!   "columns": [
//!     { "name": "Amount", "width": 72, "value": { "field": "Amount" } },
//!     { "name": "Best", "width": 72,
//!       "value": { "aggregate": { "function": "max", "expr": { "field": "Amount" } } },
//!       "hidden": { "binary": { "op": "=", "lhs": { "field": "Region" }, "rhs": { "literal": "West" } } } }
//!   ]
//! }
//! ```
//!
//! Expressions are built through [`ExprBuilder`]; a missing operand or
//! unknown name is logged and replaced by a typed null so the rest of the
//! definition still loads.

use crate::error::{ReportError, ReportResult};
use crate::fields::Fields;
use crate::flags::Flag;
use crate::json::{infer_value, to_value};
use reportcloud_diagnostics::{RC0001, RC0005, RC0006, RC0007};
use reportcloud_eval::EngineOptions;
use reportcloud_expr::{AggregateFunc, ArithOp, CompareOp, ExprBuilder, ExprId, ScopeDescriptor};
use reportcloud_types::ResultKind;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;

/// A complete report definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub name: String,
    #[serde(default)]
    pub dataset: DataSetDefinition,
    #[serde(default)]
    pub options: EngineOptions,
    /// Grouping the report is run per instance of; the whole data set if absent
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    /// Rows used when no data file is given
    #[serde(default)]
    pub rows: Vec<JsonValue>,
}

impl ReportDefinition {
    /// Parse a definition from JSON text
    pub fn from_json(text: &str) -> ReportResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a definition file
    pub fn from_path(path: impl AsRef<Path>) -> ReportResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_json(&text)
    }
}

/// The data set a report runs over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSetDefinition {
    pub name: String,
    /// Field entries; see [`Fields::load`]
    pub fields: Vec<JsonValue>,
    /// Groupings, outermost first
    pub groupings: Vec<GroupingDefinition>,
}

impl Default for DataSetDefinition {
    fn default() -> Self {
        Self {
            name: "DataSet1".to_string(),
            fields: Vec::new(),
            groupings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingDefinition {
    pub name: String,
    pub fields: Vec<String>,
}

/// One table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    /// Width in points
    pub width: Option<f64>,
    /// Value of the column for each detail row
    pub value: Option<ExprDefinition>,
    /// Value shown once per group, evaluated at the group's first row
    pub footer: Option<ExprDefinition>,
    /// Hides the column for a group when true
    pub hidden: Option<ExprDefinition>,
    pub fixed_header: Option<Flag>,
}

/// An expression as written in a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprDefinition {
    /// A constant whose kind follows its JSON form
    Literal(JsonValue),
    /// A constant of an explicit kind
    Typed {
        value: JsonValue,
        #[serde(rename = "type")]
        kind: String,
    },
    /// A field of the current row
    Field(String),
    Unary {
        op: String,
        operand: Option<Box<ExprDefinition>>,
    },
    Binary {
        op: String,
        lhs: Option<Box<ExprDefinition>>,
        rhs: Option<Box<ExprDefinition>>,
    },
    Aggregate {
        function: String,
        expr: Option<Box<ExprDefinition>>,
        #[serde(default)]
        scope: ScopeDescriptor,
    },
}

enum Operator {
    Arithmetic(ArithOp),
    Compare(CompareOp),
    And,
    Or,
}

impl Operator {
    fn parse(symbol: &str) -> Option<Self> {
        let op = match symbol.to_ascii_lowercase().as_str() {
            "+" => Operator::Arithmetic(ArithOp::Plus),
            "-" => Operator::Arithmetic(ArithOp::Minus),
            "*" => Operator::Arithmetic(ArithOp::Multiply),
            "/" => Operator::Arithmetic(ArithOp::Divide),
            "=" | "==" => Operator::Compare(CompareOp::Eq),
            "!=" | "<>" => Operator::Compare(CompareOp::Ne),
            "<" => Operator::Compare(CompareOp::Lt),
            "<=" => Operator::Compare(CompareOp::Le),
            ">" => Operator::Compare(CompareOp::Gt),
            ">=" => Operator::Compare(CompareOp::Ge),
            "and" | "&&" => Operator::And,
            "or" | "||" => Operator::Or,
            _ => return None,
        };
        Some(op)
    }
}

impl ExprDefinition {
    /// Build this expression into `builder`, resolving field names
    /// against `fields`.
    pub fn build(&self, builder: &mut ExprBuilder, fields: &Fields) -> ExprId {
        match self {
            ExprDefinition::Literal(json) => builder.literal(infer_value(json)),

            ExprDefinition::Typed { value, kind } => {
                let Some(kind) = ResultKind::parse(kind) else {
                    builder
                        .log_mut()
                        .log_error(8, RC0007, format!("Unknown literal type '{}'.", kind));
                    return builder.null(ResultKind::Object);
                };
                match to_value(value, kind) {
                    Ok(v) if v.is_null() => builder.null(kind),
                    Ok(v) => builder.literal(v),
                    Err(e) => {
                        builder.log_mut().log_error(
                            8,
                            RC0007,
                            format!("Invalid {} literal {}: {}", kind, value, e),
                        );
                        builder.null(kind)
                    }
                }
            }

            ExprDefinition::Field(name) => match fields.get(name) {
                Some(field) => builder.field(field.column, field.kind),
                None => {
                    builder
                        .log_mut()
                        .log_error(8, RC0005, format!("Unknown field '{}'.", name));
                    builder.null(ResultKind::Object)
                }
            },

            ExprDefinition::Unary { op, operand } => {
                let operand = operand.as_ref().map(|e| e.build(builder, fields));
                match op.to_ascii_lowercase().as_str() {
                    "-" | "negate" => {
                        let operand = builder.require(operand, "Negate", "Operand", ResultKind::Int32);
                        builder.negate(operand)
                    }
                    "not" | "!" => {
                        let operand = builder.require(operand, "Not", "Operand", ResultKind::Boolean);
                        builder.not(operand)
                    }
                    _ => {
                        builder
                            .log_mut()
                            .log_error(8, RC0001, format!("Unknown unary operator '{}'.", op));
                        builder.null(ResultKind::Object)
                    }
                }
            }

            ExprDefinition::Binary { op, lhs, rhs } => {
                let lhs = lhs.as_ref().map(|e| e.build(builder, fields));
                let rhs = rhs.as_ref().map(|e| e.build(builder, fields));
                let Some(operator) = Operator::parse(op) else {
                    builder
                        .log_mut()
                        .log_error(8, RC0001, format!("Unknown binary operator '{}'.", op));
                    return builder.null(ResultKind::Object);
                };
                let owner = format!("Operator '{}'", op);
                match operator {
                    Operator::Arithmetic(arith) => {
                        let (lhs, rhs) = operands(builder, lhs, rhs, &owner, ResultKind::Int32);
                        builder.arithmetic(arith, lhs, rhs)
                    }
                    Operator::Compare(cmp) => {
                        let (lhs, rhs) = operands(builder, lhs, rhs, &owner, ResultKind::Object);
                        builder.compare(cmp, lhs, rhs)
                    }
                    Operator::And => {
                        let (lhs, rhs) = operands(builder, lhs, rhs, &owner, ResultKind::Boolean);
                        builder.and(lhs, rhs)
                    }
                    Operator::Or => {
                        let (lhs, rhs) = operands(builder, lhs, rhs, &owner, ResultKind::Boolean);
                        builder.or(lhs, rhs)
                    }
                }
            }

            ExprDefinition::Aggregate {
                function,
                expr,
                scope,
            } => {
                let inner = expr.as_ref().map(|e| e.build(builder, fields));
                let Some(func) = AggregateFunc::parse(function) else {
                    builder.log_mut().log_error(
                        8,
                        RC0006,
                        format!("Unknown aggregate function '{}'.", function),
                    );
                    return builder.null(ResultKind::Object);
                };
                let owner = format!("Aggregate '{}'", func.name());
                let inner = builder.require(inner, &owner, "Expression", ResultKind::Float64);
                builder.aggregate(func, inner, scope.clone())
            }
        }
    }
}

/// Both operands of a binary operator. A missing side stands in as a null
/// of the other side's kind.
fn operands(
    builder: &mut ExprBuilder,
    lhs: Option<ExprId>,
    rhs: Option<ExprId>,
    owner: &str,
    fallback: ResultKind,
) -> (ExprId, ExprId) {
    let kind = lhs.or(rhs).map_or(fallback, |id| builder.kind(id));
    let lhs = builder.require(lhs, owner, "Left", kind);
    let rhs = builder.require(rhs, owner, "Right", kind);
    (lhs, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reportcloud_diagnostics::{RC0003, ReportLog, Severity};
    use serde_json::json;

    fn fields() -> Fields {
        let mut log = ReportLog::new();
        Fields::load(
            &[
                json!({"name": "Region", "type": "string"}),
                json!({"name": "Amount", "type": "int32"}),
            ],
            &mut log,
        )
    }

    fn build(json: JsonValue) -> (ExprBuilder, ExprId) {
        let definition: ExprDefinition = serde_json::from_value(json).unwrap();
        let mut builder = ExprBuilder::new();
        let id = definition.build(&mut builder, &fields());
        (builder, id)
    }

    #[test]
    fn test_parse_definition() {
        let definition = ReportDefinition::from_json(
            r#"{ "name": "R", "columns": [{ "name": "A", "width": 10, "fixed_header": "true" }] }"#,
        )
        .unwrap();
        assert_eq!(definition.dataset.name, "DataSet1");
        assert_eq!(definition.options, EngineOptions::default());
        assert_eq!(definition.columns[0].width, Some(10.0));
        assert_eq!(definition.columns[0].fixed_header, Some(Flag::Text("true".into())));
        assert!(definition.columns[0].value.is_none());
    }

    #[test]
    fn test_build_arithmetic() {
        let (builder, id) = build(json!({
            "binary": { "op": "-", "lhs": { "field": "amount" }, "rhs": { "literal": 10 } }
        }));
        assert_eq!(builder.kind(id), ResultKind::Int32);
        assert_eq!(builder.dump(id), "(-int32 $1:int32 10)");
        assert!(builder.log().is_empty());
    }

    #[test]
    fn test_build_typed_literal() {
        let (builder, id) = build(json!({ "typed": { "value": "2.5", "type": "decimal" } }));
        assert_eq!(builder.kind(id), ResultKind::Decimal);

        let (builder, id) = build(json!({ "typed": { "value": "soon", "type": "datetime" } }));
        assert_eq!(builder.kind(id), ResultKind::DateTime);
        assert_eq!(builder.log().diagnostics()[0].code, RC0007);
    }

    #[test]
    fn test_missing_operand_is_required() {
        let (builder, id) = build(json!({ "binary": { "op": "+", "lhs": { "field": "Amount" } } }));
        assert_eq!(builder.kind(id), ResultKind::Int32);
        let diagnostic = &builder.log().diagnostics()[0];
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.code, RC0003);
        assert_eq!(diagnostic.message, "Operator '+' requires the Right element.");
    }

    #[test]
    fn test_unknown_names_degrade_to_null() {
        let (builder, id) = build(json!({ "field": "Missing" }));
        assert_eq!(builder.kind(id), ResultKind::Object);
        assert_eq!(builder.log().diagnostics()[0].code, RC0005);

        let (builder, _) = build(json!({ "aggregate": { "function": "median", "expr": { "field": "Amount" } } }));
        assert_eq!(builder.log().diagnostics()[0].code, RC0006);

        let (builder, _) = build(json!({ "binary": { "op": "%", "lhs": { "literal": 1 }, "rhs": { "literal": 2 } } }));
        assert_eq!(builder.log().diagnostics()[0].code, RC0001);
    }

    #[test]
    fn test_build_aggregate_with_scope() {
        let (builder, id) = build(json!({
            "aggregate": {
                "function": "Stdevp",
                "expr": { "field": "Amount" },
                "scope": { "type": "group", "name": "ByRegion" }
            }
        }));
        assert_eq!(builder.kind(id), ResultKind::Float64);
        assert_eq!(builder.dump(id), "(stdevp#0 @group:ByRegion $1:int32)");
    }
}
