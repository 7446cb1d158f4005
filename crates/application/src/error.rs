//! Application error types

use ricochet_domain::DomainError;
use thiserror::Error;

use crate::ports::TransportError;

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A request declares a rule or retry policy that cannot be evaluated.
    #[error("invalid policy configuration in '{spec}': {source}")]
    InvalidPolicyConfiguration {
        /// Label of the offending request.
        spec: String,
        /// Underlying domain error.
        source: DomainError,
    },

    /// An exchange failed and the engine is configured to abort the run.
    #[error("transport failure in '{spec}': {source}")]
    Transport {
        /// Label of the request whose exchange failed.
        spec: String,
        /// Underlying transport error.
        source: TransportError,
    },

    /// No response is stored under the requested name.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
