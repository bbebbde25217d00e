//! Collector for definition diagnostics

use crate::{Diagnostic, ErrorCode, Severity};

/// Collects the diagnostics raised while a report definition is built.
///
/// Entries are kept in the order they were reported and each one is
/// forwarded to the `log` facade under the `reportcloud::definition` target.
#[derive(Debug, Clone, Default)]
pub struct ReportLog {
    entries: Vec<Diagnostic>,
}

impl ReportLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) {
        log::log!(
            target: "reportcloud::definition",
            diagnostic.severity.log_level(),
            "{}",
            diagnostic
        );
        self.entries.push(diagnostic);
    }

    /// Record a message at a numeric definition level (4 = warning, 8 = error)
    pub fn log_error(&mut self, level: u8, code: ErrorCode, message: impl Into<String>) {
        self.report(Diagnostic::new(Severity::from_level(level), code, message));
    }

    /// Record a warning
    pub fn warning(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.report(Diagnostic::warning(code, message));
    }

    /// Record an error
    pub fn error(&mut self, code: ErrorCode, message: impl Into<String>) {
        self.report(Diagnostic::error(code, message));
    }

    /// All recorded diagnostics
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Highest severity recorded so far
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|d| d.severity).max()
    }

    /// Whether any error-level diagnostic was recorded
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry of `other` into this log without re-forwarding it
    pub fn append(&mut self, other: &mut ReportLog) {
        self.entries.append(&mut other.entries);
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl IntoIterator for ReportLog {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
