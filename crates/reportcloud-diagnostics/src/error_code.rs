//! Report engine error codes following a structured numbering system
//!
//! Error code ranges:
//! - RC0001-RC0099: Definition errors (structure of the report definition)
//! - RC0100-RC0199: Type errors (operand kinds, static coercions)
//! - RC0200-RC0299: Evaluation errors (runtime)
//! - RC0400-RC0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// Check if this is a definition error (0001-0099)
    pub const fn is_definition_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a type error (0100-0199)
    pub const fn is_type_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is an evaluation error (0200-0299)
    pub const fn is_evaluation_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Check if this is a system error (0400-0499)
    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RC{:04}", self.0)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Definition errors (0001-0099)
    map.insert(1, ErrorInfo::new("Unknown element"));
    map.insert(2, ErrorInfo::new("Duplicate name")
        .with_help("Names must be unique within their collection, ignoring case"));
    map.insert(3, ErrorInfo::new("Missing required element"));
    map.insert(4, ErrorInfo::new("Invalid boolean value"));
    map.insert(5, ErrorInfo::new("Unknown field reference"));
    map.insert(6, ErrorInfo::new("Unknown aggregate function"));
    map.insert(7, ErrorInfo::new("Invalid literal"));
    map.insert(8, ErrorInfo::new("Unknown scope"));

    // Type errors (0100-0199)
    map.insert(100, ErrorInfo::new("Type mismatch"));
    map.insert(101, ErrorInfo::new("Operator not defined for operand kinds"));
    map.insert(102, ErrorInfo::new("Constant expression could not be folded"));

    // Evaluation errors (0200-0299)
    map.insert(200, ErrorInfo::new("Evaluation failed"));
    map.insert(201, ErrorInfo::new("Division by zero"));
    map.insert(202, ErrorInfo::new("Overflow error"));
    map.insert(203, ErrorInfo::new("Invalid conversion"));
    map.insert(204, ErrorInfo::new("Field not found"));
    map.insert(205, ErrorInfo::new("Values not comparable"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Invalid format"));

    map
});

// Definition errors
pub const RC0001: ErrorCode = ErrorCode::new(1);
pub const RC0002: ErrorCode = ErrorCode::new(2);
pub const RC0003: ErrorCode = ErrorCode::new(3);
pub const RC0004: ErrorCode = ErrorCode::new(4);
pub const RC0005: ErrorCode = ErrorCode::new(5);
pub const RC0006: ErrorCode = ErrorCode::new(6);
pub const RC0007: ErrorCode = ErrorCode::new(7);
pub const RC0008: ErrorCode = ErrorCode::new(8);

// Type errors
pub const RC0100: ErrorCode = ErrorCode::new(100);
pub const RC0101: ErrorCode = ErrorCode::new(101);
pub const RC0102: ErrorCode = ErrorCode::new(102);

// Evaluation errors
pub const RC0200: ErrorCode = ErrorCode::new(200);
pub const RC0201: ErrorCode = ErrorCode::new(201);
pub const RC0202: ErrorCode = ErrorCode::new(202);
pub const RC0203: ErrorCode = ErrorCode::new(203);
pub const RC0204: ErrorCode = ErrorCode::new(204);
pub const RC0205: ErrorCode = ErrorCode::new(205);

// System errors
pub const RC0400: ErrorCode = ErrorCode::new(400);
pub const RC0401: ErrorCode = ErrorCode::new(401);
pub const RC0402: ErrorCode = ErrorCode::new(402);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(RC0001.to_string(), "RC0001");
        assert_eq!(RC0201.to_string(), "RC0201");
    }

    #[test]
    fn test_error_categories() {
        assert!(RC0001.is_definition_error());
        assert!(!RC0001.is_type_error());

        assert!(RC0101.is_type_error());
        assert!(RC0203.is_evaluation_error());
        assert!(RC0401.is_system_error());
    }

    #[test]
    fn test_error_info() {
        assert_eq!(RC0002.info().description, "Duplicate name");
        assert!(RC0002.info().help.is_some());
        assert_eq!(ErrorCode::new(999).info().description, "Unknown error");
    }
}
