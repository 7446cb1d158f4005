//! Transport adapter settings.

use serde::{Deserialize, Serialize};

/// Default transport timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default redirect limit.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Settings applied when building the reqwest client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Timeout applied to requests that do not declare their own.
    pub timeout_ms: u64,
    /// Maximum number of redirects followed.
    pub max_redirects: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            user_agent: concat!("ricochet/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl TransportSettings {
    /// Sets the default timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}
