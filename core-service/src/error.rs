//! Boundary error handling
//!
//! Only malformed input crosses the core boundary as a hard failure.
//! Stage and recording failures are turned into data by their owners.

use serde::Serialize;

/// Rejection of an analysis request before any stage runs
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid request body")]
    MalformedBody(String),

    #[error("Missing 'log' field")]
    MissingLog,

    #[error("Field 'log' must be a string")]
    NotText,

    #[error("Field 'log' is empty")]
    EmptyLog,
}

impl InputError {
    /// Human readable detail for the `details` field of the error envelope
    pub fn details(&self) -> String {
        match self {
            InputError::MalformedBody(reason) => reason.clone(),
            InputError::MissingLog => "Request must contain a 'log' field".to_string(),
            InputError::NotText => "The 'log' field must be a JSON string".to_string(),
            InputError::EmptyLog => "The 'log' field must contain non-whitespace text".to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
            details: self.details(),
        }
    }
}

/// `{error, details}` envelope returned for rejected input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}
