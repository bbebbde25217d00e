//! Diagnostic records

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level
///
/// Report definitions historically carry numeric levels: 4 for problems that
/// are ignored with a default, 8 for problems that leave an element degraded.
/// `from_level` and `level` map between the two forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Hint - suggestion for improvement
    Hint,
    /// Information - informational message
    Info,
    /// Warning - the element was ignored or defaulted
    Warning,
    /// Error - the owning element is degraded
    Error,
}

impl Severity {
    /// Map a numeric definition level onto a severity
    pub const fn from_level(level: u8) -> Self {
        match level {
            0 => Severity::Hint,
            1..=3 => Severity::Info,
            4..=7 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Numeric level of this severity
    pub const fn level(self) -> u8 {
        match self {
            Severity::Hint => 0,
            Severity::Info => 1,
            Severity::Warning => 4,
            Severity::Error => 8,
        }
    }

    /// The `log` level diagnostics of this severity are forwarded at
    pub const fn log_level(self) -> log::Level {
        match self {
            Severity::Hint => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
            Severity::Hint => write!(f, "hint"),
        }
    }
}

/// A diagnostic message with context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: Severity,
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Path of the definition element the problem was found in
    pub item: Option<String>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic with an explicit severity
    pub fn new(severity: Severity, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            item: None,
            help: None,
        }
    }

    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create a new warning diagnostic
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Set the element path
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render for a terminal, coloring the severity
    #[cfg(feature = "colored")]
    pub fn to_colored_string(&self) -> String {
        use colored::Colorize;

        let severity = match self.severity {
            Severity::Error => self.severity.to_string().red().bold(),
            Severity::Warning => self.severity.to_string().yellow().bold(),
            Severity::Info => self.severity.to_string().blue(),
            Severity::Hint => self.severity.to_string().dimmed(),
        };
        let mut out = format!("{}: {} - {}", severity, self.code, self.message);
        if let Some(item) = &self.item {
            out.push_str(&format!(" in {}", item.cyan()));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - {}", self.severity, self.code, self.message)?;
        if let Some(item) = &self.item {
            write!(f, " in {}", item)?;
        }
        Ok(())
    }
}
