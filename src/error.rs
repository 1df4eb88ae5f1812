//! Error types for URI parsing and construction
use thiserror::Error;

/// Raised when a raw string cannot be decomposed into URI components.
///
/// Carries the offending input so callers can report exactly what was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct UriError {
    message: String,
    uri: String,
}

impl UriError {
    pub fn new(message: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            uri: uri.into(),
        }
    }

    /// The human readable reason
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The input string that failed to parse
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Raised by mutators and the query parameter factory on type or range violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgumentError {
    #[error(
        "Invalid URI scheme: got `{scheme}` but must start with a letter and may only contain letters, digits, and -/+/."
    )]
    InvalidScheme { scheme: String },

    #[error("Invalid URI port value: must be between 0-65535, got `{port}` instead")]
    InvalidPort { port: i64 },

    #[error("Unsupported query parameter of type `{kind}` for key `{key}`")]
    UnsupportedParameterType { kind: &'static str, key: String },

    #[error("Invalid element of type `{kind}` in array query parameter `{key}`: expected string or null")]
    InvalidArrayElement { kind: &'static str, key: String },
}
