//! CLI functionality for the rcloud tool
//!
//! This module contains all CLI-related functionality including:
//! - Running a report definition over JSON rows
//! - Checking a definition and dumping its folded expressions
//! - Output formatting

pub mod check;
pub mod output;
pub mod run;
