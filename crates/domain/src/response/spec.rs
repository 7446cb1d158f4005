//! Captured response type
//!
//! A response is immutable once captured: the engine clones it into the
//! response context rather than mutating it in place.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A completed HTTP exchange as seen by validators and retry predicates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response body as a (lossily decoded) UTF-8 string.
    pub body: String,
    /// Response headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Time taken by the exchange.
    #[serde(default, with = "duration_millis")]
    pub duration: Duration,
}

impl Response {
    /// Creates a response with no headers and zero duration.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: HashMap::new(),
            duration: Duration::ZERO,
        }
    }

    /// Creates a response from raw body bytes, replacing invalid UTF-8.
    #[must_use]
    pub fn from_bytes(
        status: u16,
        headers: HashMap<String, String>,
        body: &[u8],
        duration: Duration,
    ) -> Self {
        Self {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
            headers,
            duration,
        }
    }

    /// Adds a header (builder pattern).
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the exchange duration (builder pattern).
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
