use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// FieldIssue / ValidationFailure
// ---------------------------------------------------------------------------

/// A single problem with a form field, shown inline next to that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub issues: Vec<FieldIssue>,
}

impl ValidationFailure {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.issues.iter().map(|i| i.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

// ---------------------------------------------------------------------------
// SurveyError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("location catalog not found: {}", .0.display())]
    CatalogMissing(PathBuf),

    #[error("validation failed: {0}")]
    Validation(ValidationFailure),

    #[error("event not allowed on page {page}: {reason}")]
    InvalidEvent { page: usize, reason: String },

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("remote resource not found: {0}")]
    MissingResource(String),

    #[error("spreadsheet authentication failed: {0}")]
    AuthFailure(String),

    #[error("network failure: {0}")]
    NetworkFailure(String),

    #[error("spreadsheet service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("sheet header does not match submission columns (expected '{expected}', found '{found}')")]
    HeaderMismatch { expected: String, found: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl SurveyError {
    /// True for failures of the remote spreadsheet service, which the user
    /// may retry by hand.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SurveyError::MissingResource(_)
                | SurveyError::AuthFailure(_)
                | SurveyError::NetworkFailure(_)
                | SurveyError::Remote { .. }
        )
    }
}

impl From<ValidationFailure> for SurveyError {
    fn from(failure: ValidationFailure) -> Self {
        SurveyError::Validation(failure)
    }
}

pub type Result<T> = std::result::Result<T, SurveyError>;
