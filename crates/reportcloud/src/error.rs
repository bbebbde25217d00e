//! Report loading and run errors

use reportcloud_diagnostics::{ErrorCode, RC0008, RC0203, RC0401, RC0402};
use reportcloud_eval::EvalError;
use reportcloud_types::CoercionError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors raised while loading a definition or running a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// A definition or data file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON text is not a valid definition or row list
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The report is grouped by a grouping the data set does not declare
    #[error("Unknown group '{0}'")]
    UnknownGroup(String),

    /// A row value does not convert to its field's kind
    #[error("Row {row}, field '{field}': {source}")]
    Row {
        row: usize,
        field: String,
        #[source]
        source: CoercionError,
    },

    /// Evaluation failed
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn row(row: usize, field: impl Into<String>, source: CoercionError) -> Self {
        Self::Row {
            row,
            field: field.into(),
            source,
        }
    }

    /// The diagnostic code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ReportError::Io { .. } => RC0401,
            ReportError::Json(_) => RC0402,
            ReportError::UnknownGroup(_) => RC0008,
            ReportError::Row { .. } => RC0203,
            ReportError::Eval(e) => e.code(),
        }
    }
}
