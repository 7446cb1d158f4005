//! HTTP transport port
//!
//! The engine only needs one call: issue a declared request and get a
//! response back. Connection pooling, TLS and proxies belong to adapters.

use async_trait::async_trait;
use ricochet_domain::{RequestSpec, Response};
use thiserror::Error;

/// Reasons an exchange could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The target URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The exchange exceeded its timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Timeout that was applied.
        timeout_ms: u64,
    },

    /// The remote host refused the connection.
    #[error("connection refused by {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    /// Any other transport error.
    #[error("{0}")]
    Other(String),
}

/// Port for issuing HTTP exchanges.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues the request and waits for the complete response.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` if the exchange could not be completed.
    /// A non-2xx status is a normal response, not an error.
    async fn issue(&self, request: &RequestSpec) -> Result<Response, TransportError>;
}
