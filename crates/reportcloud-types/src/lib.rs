//! Report expression value model
//!
//! This crate defines the finite set of result kinds an expression can
//! produce and the explicit coercion rules between them:
//! - `ResultKind`: Boolean, Int32, Float64, Decimal, String, DateTime, Object
//! - `Value`: a runtime value of one of those kinds, or null
//! - `coercion`: scalar conversions used by the typed evaluation entry points
//!
//! # Absent values
//!
//! Null (and the floating point NaN sentinel) has a fixed representation per
//! target kind when requested through a typed accessor:
//!
//! | kind     | absent representation   |
//! |----------|-------------------------|
//! | Boolean  | `false`                 |
//! | Int32    | `i32::MIN`              |
//! | Float64  | `f64::NAN`              |
//! | Decimal  | `Decimal::MIN`          |
//! | String   | `""`                    |
//! | DateTime | `NaiveDateTime::MIN`    |
//! | Object   | `Value::Null`           |

pub mod coercion;
mod kind;
mod value;

pub use coercion::{CoercionError, CoercionResult};
pub use kind::*;
pub use value::*;

pub use chrono::NaiveDateTime;
pub use rust_decimal::Decimal;
