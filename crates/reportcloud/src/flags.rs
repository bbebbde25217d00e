//! True/false flags in report definitions

use reportcloud_diagnostics::{RC0004, ReportLog};
use serde::{Deserialize, Serialize};

/// Parse a definition flag, ignoring case.
///
/// Anything other than `true` or `false` is logged as a warning and read as
/// `false`.
pub fn parse_boolean(text: &str, log: &mut ReportLog) -> bool {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => {
            log.log_error(
                4,
                RC0004,
                format!("Unknown True/False value '{}'.  False assumed.", text),
            );
            false
        }
    }
}

/// A flag as written in JSON: either a boolean or its text form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    pub fn resolve(&self, log: &mut ReportLog) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(text) => parse_boolean(text, log),
        }
    }
}
