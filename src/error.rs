//! Error taxonomy for the reconciliation engine
//!
//! Conditions the engine recovers from locally (shape mismatches, missing
//! worksheet columns, unmatched keys) are counted in reports and never
//! returned from here. Everything else surfaces as an [`EngineError`] so the
//! caller sees one small typed failure instead of a raw transport error.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Classification of every failure mode the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Remote payload did not match any recognized shape
    ShapeMismatch,
    /// Worksheet lacks one of the required header labels
    MissingColumn,
    /// Spreadsheet row key has no entry in the reconciliation map
    UnmatchedKey,
    /// A precondition for starting an operation is unmet
    ValidationFailure,
    /// A single remote insert failed
    SubmissionFailure,
    /// Transport for a report fetch failed
    FetchFailure,
    /// Workbook could not be read or serialized
    WorkbookError,
    /// Local file I/O failed
    IoError,
    /// Configuration is invalid
    ConfigError,
}

impl ErrorCode {
    /// Whether the engine absorbs this condition without surfacing it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorCode::ShapeMismatch | ErrorCode::MissingColumn | ErrorCode::UnmatchedKey
        )
    }

    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::ShapeMismatch | ErrorCode::MissingColumn | ErrorCode::UnmatchedKey => {
                "recovered"
            }
            ErrorCode::ValidationFailure | ErrorCode::ConfigError => "client_error",
            ErrorCode::SubmissionFailure | ErrorCode::FetchFailure => "remote_error",
            ErrorCode::WorkbookError | ErrorCode::IoError => "io_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::ShapeMismatch => "shape_mismatch",
            ErrorCode::MissingColumn => "missing_column",
            ErrorCode::UnmatchedKey => "unmatched_key",
            ErrorCode::ValidationFailure => "validation_failure",
            ErrorCode::SubmissionFailure => "submission_failure",
            ErrorCode::FetchFailure => "fetch_failure",
            ErrorCode::WorkbookError => "workbook_error",
            ErrorCode::IoError => "io_error",
            ErrorCode::ConfigError => "config_error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation was refused before doing any work
    #[error("invalid {parameter}: {message}")]
    Validation { parameter: String, message: String },

    /// Fetching a report failed; the message is already stripped of transport types
    #[error("failed to fetch {report} report: {message}")]
    Fetch { report: String, message: String },

    /// A single remote insert was rejected or could not be delivered
    #[error("submission for {id} failed: {message}")]
    Submission { id: String, message: String },

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn validation(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn fetch(report: impl fmt::Display, message: impl Into<String>) -> Self {
        EngineError::Fetch {
            report: report.to_string(),
            message: message.into(),
        }
    }

    pub fn submission(id: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Submission {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn workbook(err: impl fmt::Display) -> Self {
        EngineError::Workbook(err.to_string())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation { .. } => ErrorCode::ValidationFailure,
            EngineError::Fetch { .. } => ErrorCode::FetchFailure,
            EngineError::Submission { .. } => ErrorCode::SubmissionFailure,
            EngineError::Workbook(_) => ErrorCode::WorkbookError,
            EngineError::Io(_) => ErrorCode::IoError,
            EngineError::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Reason string recorded against a failed batch item.
    pub fn reason(&self) -> String {
        match self {
            EngineError::Submission { message, .. } => message.clone(),
            EngineError::Fetch { message, .. } => message.clone(),
            EngineError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
