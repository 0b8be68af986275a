//! Error types for the translation pipeline

use crate::parser::ParseError;
use thiserror::Error;

/// Errors that can occur while translating a `find` invocation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslationError {
    #[error("Input must be a string")]
    InvalidArgumentType,

    #[error("Empty query")]
    EmptyQuery,

    #[error("Wrong format: {0}")]
    MalformedInvocation(String),

    #[error("Missing collection name")]
    MissingCollectionName,

    #[error("Wrong or not supported MongoDB method ({0})")]
    UnsupportedMethod(String),

    #[error("Method is not parenthesized")]
    UnbalancedArguments,

    #[error("Invalid arguments: {0}")]
    ArgumentParse(#[from] ParseError),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}

impl TranslationError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        TranslationError::MalformedInvocation(reason.into())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
