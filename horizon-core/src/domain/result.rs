//! Result and error types for the core library

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Only malformed input and collaborator failures are errors. Expected
/// outcomes such as "not enough history yet" travel as [`DataIssue`]
/// values inside the result types instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Currency mismatch: cannot combine {left} with {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("No exchange rate available from {from} to {to} on {date}")]
    MissingExchangeRate {
        from: String,
        to: String,
        date: NaiveDate,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a calculation (numeric overflow) error
    pub fn calculation(msg: impl Into<String>) -> Self {
        Self::Calculation(msg.into())
    }

    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Machine-readable code for a non-fatal data problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataIssueCode {
    InsufficientHistory,
    PoorDataQuality,
}

impl DataIssueCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientHistory => "insufficient_history",
            Self::PoorDataQuality => "poor_data_quality",
        }
    }
}

/// A non-fatal reason why a calculation could not produce a figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataIssue {
    pub code: DataIssueCode,
    pub message: String,
}

impl DataIssue {
    pub fn insufficient_history(required: usize, found: usize) -> Self {
        Self {
            code: DataIssueCode::InsufficientHistory,
            message: format!(
                "Need at least {} months of history to estimate growth, found {}",
                required, found
            ),
        }
    }

    pub fn poor_data_quality(missing: usize, total: usize) -> Self {
        Self {
            code: DataIssueCode::PoorDataQuality,
            message: format!(
                "{} of {} monthly samples are zero or missing",
                missing, total
            ),
        }
    }
}

/// Operation result with optional context (for serialized consumers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_from_result() {
        let err: Result<i32> = Err(Error::invalid_argument("bad interval"));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Invalid argument"));
    }

    #[test]
    fn test_data_issue_messages() {
        let issue = DataIssue::insufficient_history(6, 5);
        assert_eq!(issue.code, DataIssueCode::InsufficientHistory);
        assert!(issue.message.contains('6'));
        assert!(issue.message.contains('5'));
        assert_eq!(
            serde_json::to_value(issue.code).unwrap(),
            serde_json::json!("insufficient_history")
        );
    }
}
