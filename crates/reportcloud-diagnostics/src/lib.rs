//! Report definition diagnostics
//!
//! This crate provides the diagnostic plumbing shared by the definition
//! loader and the expression engine:
//!
//! - `ErrorCode`: structured `RC0000` codes grouped by category
//! - `Severity` and `Diagnostic`: one reported problem
//! - `ReportLog`: the collector a definition is built against. Every entry is
//!   also forwarded to the `log` facade so hosts see problems as they happen.
//!
//! Definition problems never abort construction; they are recorded here and
//! the owning element continues with a default.

mod diagnostic;
mod error_code;
mod report_log;

pub use diagnostic::*;
pub use error_code::*;
pub use report_log::*;
