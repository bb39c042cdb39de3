// SPDX-License-Identifier: MIT

//! Typed error handling for cronos-rs
//!
//! Structural parse failures are the only fatal condition inside the engine.
//! Unsupported comparison shapes, unmatched guards and empty test sets are
//! reported through result values instead of errors.

use thiserror::Error;

/// Top-level error type for cronos-rs
#[derive(Debug, Error)]
pub enum CronosError {
    /// Errors raised by the analysis engine
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Requests rejected before reaching the engine
    #[error("Request rejected: {0}")]
    Request(#[from] RequestError),

    /// Configuration errors (invalid settings file, bad env values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors produced by the condition analysis engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Source or condition text could not be parsed into a syntax tree
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Text parsed, but contains no supported comparison
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// The grammar could not be loaded into the parser
    #[error("Grammar unavailable: {0}")]
    Grammar(String),
}

/// Admission-control errors raised by the service layer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Source snippet exceeds the configured byte limit
    #[error("Source is {size} bytes, limit is {limit}")]
    SourceTooLarge { size: usize, limit: usize },

    /// Too many test cases supplied
    #[error("{count} test cases supplied, limit is {limit}")]
    TooManyTestCases { count: usize, limit: usize },

    /// A required field was empty
    #[error("Missing field: {0}")]
    MissingField(String),
}

impl AnalysisError {
    /// Create a parse error at a 1-based line/column
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an invalid condition error
    pub fn invalid_condition(text: impl Into<String>) -> Self {
        Self::InvalidCondition(text.into())
    }
}

impl CronosError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether the error was caused by the caller's input rather than the host
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Analysis(_) | Self::Request(_) | Self::Json(_) | Self::Yaml(_)
        )
    }
}

pub type Result<T, E = CronosError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = AnalysisError::parse(3, 7, "unexpected token");
        assert_eq!(
            err.to_string(),
            "Parse error at line 3, column 7: unexpected token"
        );
    }

    #[test]
    fn test_analysis_error_converts_to_top_level() {
        let err: CronosError = AnalysisError::invalid_condition("price").into();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Analysis error: Invalid condition: price"
        );
    }

    #[test]
    fn test_request_error_display() {
        let err = RequestError::TooManyTestCases {
            count: 12,
            limit: 10,
        };
        assert_eq!(err.to_string(), "12 test cases supplied, limit is 10");
    }

    #[test]
    fn test_config_error_is_not_client_error() {
        assert!(!CronosError::config("bad port").is_client_error());
    }
}
