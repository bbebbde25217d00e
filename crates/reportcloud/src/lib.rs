//! Report expression engine
//!
//! This crate ties the expression pipeline together:
//! - Loading JSON report definitions (fields, groupings, table columns)
//! - Building and constant folding their expressions
//! - Running them over in-memory rows, group by group, with per-run caching
//!
//! # Example
//!
//! ```
//! use reportcloud::{Report, ReportDefinition};
//!
//! let definition: ReportDefinition = serde_json::from_str(r#"{
//!     "name": "Scores",
//!     "dataset": { "name": "Scores", "fields": [{ "name": "Score", "type": "int32" }] },
//!     "columns": [
//!         { "name": "Score", "width": 72, "value": { "field": "Score" } },
//!         { "name": "Best", "width": 72,
//!           "value": { "aggregate": { "function": "max", "expr": { "field": "Score" } } } }
//!     ],
//!     "rows": [[3], [9], [4]]
//! }"#).unwrap();
//!
//! let report = Report::compile(definition);
//! let output = report.run_embedded().unwrap();
//! assert_eq!(output.groups[0].rows[0]["Best"], serde_json::json!(9));
//! ```

pub mod definition;
pub mod error;
pub mod fields;
pub mod flags;
pub mod json;
pub mod report;
pub mod table;
pub mod visibility;

// Re-export all public APIs from internal crates
pub use reportcloud_diagnostics as diagnostics;
pub use reportcloud_eval as eval;
pub use reportcloud_expr as expr;
pub use reportcloud_types as types;

// Convenience re-exports
pub use definition::{ColumnDefinition, DataSetDefinition, ExprDefinition, ReportDefinition};
pub use error::{ReportError, ReportResult};
pub use fields::{Field, Fields};
pub use report::{GroupOutput, Report, ReportOutput};
pub use reportcloud_diagnostics::{Diagnostic, ReportLog, Severity};
pub use reportcloud_eval::{EngineOptions, ExecutionInstance, ExprEngine, MemoryDataSet};
pub use reportcloud_types::{ResultKind, Value};
pub use table::TableColumn;
pub use visibility::Visibility;

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
