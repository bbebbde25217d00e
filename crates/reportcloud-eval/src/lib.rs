//! Evaluation of report expressions
//!
//! This crate runs the frozen trees built by `reportcloud-expr` against
//! report data:
//!
//! - [`ExprEngine`]: typed entry points (object, boolean, int32, float64,
//!   decimal, text, timestamp) over one shared, immutable tree
//! - [`ExecutionInstance`]: the state of one report run, owning the
//!   [`ExecutionCache`] aggregate results are memoized in
//! - [`DataScope`]: what the engine needs from the data layer, with the
//!   in-memory [`MemoryDataSet`] implementation
//! - [`ScopeBoundary`]: the aggregates to invalidate when a run moves from
//!   one group instance to the next
//!
//! # Absent values
//!
//! Null results and the NaN "no data" value of Stdevp are reported by every
//! typed entry point as that kind's absent representation: null for the
//! generic entry point, `i32::MIN`, `Decimal::MIN` and
//! `NaiveDateTime::MIN` for the fixed kinds, NaN for float64, `false` for
//! boolean and the empty string for text.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use reportcloud_eval::{ExecutionInstance, ExprEngine, MemoryDataSet, RowId};
//! use reportcloud_expr::{ExprBuilder, FieldId, ScopeDescriptor};
//! use reportcloud_types::{ResultKind, Value};
//!
//! let mut data = MemoryDataSet::new("Scores", vec!["Score".into()]);
//! for score in [2, 4, 4, 4, 5, 5, 7, 9] {
//!     data.push_row(vec![Value::Int32(score)]).unwrap();
//! }
//!
//! let mut builder = ExprBuilder::new();
//! let score = builder.field(FieldId(0), ResultKind::Int32);
//! let stdevp = builder.stdevp(score, ScopeDescriptor::Default);
//! let (tree, _log) = builder.finish();
//!
//! let engine = ExprEngine::new(Arc::new(tree));
//! let mut run = ExecutionInstance::new(Arc::new(data));
//! let value = engine.eval_float64(stdevp, &mut run, Some(RowId(0))).unwrap();
//! assert!((value - 2.0).abs() < 1e-9);
//! ```

mod aggregate;
pub mod cache;
pub mod engine;
pub mod error;
pub mod instance;
pub mod memory;
pub mod options;
pub mod scope;

pub use cache::{CacheSlot, CacheStats, ExecutionCache};
pub use engine::ExprEngine;
pub use error::{EvalError, EvalResult};
pub use instance::{ExecutionInstance, ScopeBoundary};
pub use memory::MemoryDataSet;
pub use options::EngineOptions;
pub use scope::{DataScope, EmptyScope, ResolvedScope, RowId};
