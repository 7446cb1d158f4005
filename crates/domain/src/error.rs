//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A retry policy or validation rule cannot be evaluated as declared.
    #[error("invalid policy configuration: {0}")]
    InvalidPolicyConfiguration(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The predicate kind is not one of the known kinds.
    #[error("unsupported predicate kind: {0}")]
    UnsupportedPredicate(String),

    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
