//! Expression trees for report formulas
//!
//! A definition loader builds every formula of a report through an
//! [`ExprBuilder`], runs [`ExprBuilder::optimize`] once per root and then
//! freezes the arena into an [`ExprTree`]. The tree is immutable from then on
//! and can be shared between any number of concurrent report runs; all
//! per-run state lives outside of it, keyed by the [`CacheKey`] each
//! aggregate occurrence received at construction.
//!
//! # Example
//!
//! ```
//! use reportcloud_expr::{ArithOp, ExprBuilder};
//! use reportcloud_types::{ResultKind, Value};
//!
//! let mut builder = ExprBuilder::new();
//! let seven = builder.literal(Value::Int32(7));
//! let ten = builder.literal(Value::Int32(10));
//! let diff = builder.arithmetic(ArithOp::Minus, seven, ten);
//! let root = builder.optimize(diff);
//!
//! let (tree, _log) = builder.finish();
//! assert_eq!(tree.kind(root), ResultKind::Int32);
//! assert_eq!(tree.dump(root), "-3");
//! ```

mod builder;
mod dump;
mod ids;
pub mod kernel;
mod node;
mod optimize;
mod tree;

pub use builder::ExprBuilder;
pub use ids::{CacheKey, ExprId, FieldId, TreeId};
pub use kernel::{ArithmeticError, ArithmeticResult};
pub use node::{AggregateFunc, ArithOp, BinaryOp, CompareOp, Node, ScopeDescriptor, UnaryOp};
pub use tree::ExprTree;
