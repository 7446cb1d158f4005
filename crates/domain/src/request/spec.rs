//! Request specification type

use serde::{Deserialize, Serialize};
use url::Url;

use super::{Headers, HttpMethod};
use crate::error::{DomainError, DomainResult};
use crate::retry::RetryPolicy;
use crate::validation::{PredicateKind, ValidationRule};

/// One declared HTTP request: what to send, how to retry it, and what to
/// assert on the final response.
///
/// Specs are immutable once a run starts; the engine only borrows them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Optional name under which the final response is stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,
    /// Target URL
    pub url: String,
    /// HTTP headers
    #[serde(default)]
    pub headers: Headers,
    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Assertions applied, in order, to the final response.
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    /// Optional retry policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    /// Delay before a request without an active retry policy is issued.
    #[serde(default)]
    pub wait_ms: u64,
    /// Per-request transport timeout override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestSpec {
    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    /// Names the request so its final response is stored under `name`.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a header, replacing any existing value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the `Accept` header.
    #[must_use]
    pub fn with_accept(self, media_type: impl Into<String>) -> Self {
        self.with_header("Accept", media_type)
    }

    /// Sets the `Content-Type` header.
    #[must_use]
    pub fn with_content_type(self, media_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", media_type)
    }

    /// Sets an `Authorization` header with the given scheme.
    #[must_use]
    pub fn with_authorization(self, scheme: &str, credentials: &str) -> Self {
        self.with_header("Authorization", format!("{scheme} {credentials}"))
    }

    /// Sets a bearer token.
    #[must_use]
    pub fn with_bearer(self, token: &str) -> Self {
        self.with_authorization("Bearer", token)
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attaches a retry policy with a static expected value.
    #[must_use]
    pub fn with_retries(
        self,
        until: PredicateKind,
        expected: impl Into<String>,
        max_retries: u32,
        interval_ms: u64,
    ) -> Self {
        self.with_retry_policy(RetryPolicy::new(until, expected, max_retries, interval_ms))
    }

    /// Attaches a retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Appends a validation rule.
    #[must_use]
    pub fn with_validation(mut self, kind: PredicateKind, expected: impl Into<String>) -> Self {
        self.validations.push(ValidationRule::new(kind, expected));
        self
    }

    /// Sets the pre-request delay.
    #[must_use]
    pub const fn with_wait_ms(mut self, wait_ms: u64) -> Self {
        self.wait_ms = wait_ms;
        self
    }

    /// Sets the transport timeout for this request.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Returns the retry policy if it drives a retry loop.
    #[must_use]
    pub fn active_retry(&self) -> Option<&RetryPolicy> {
        self.retry.as_ref().filter(|policy| policy.is_active())
    }

    /// Display label: the name if set, otherwise `METHOD url`.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.url))
    }

    /// Parses the target URL.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the URL is malformed.
    pub fn parse_url(&self) -> DomainResult<Url> {
        Url::parse(&self.url).map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.url)))
    }

    /// Checks that every validation rule and the retry policy can be evaluated.
    ///
    /// The retry policy's deferred producer is not invoked here; only its
    /// static value is checked.
    ///
    /// # Errors
    ///
    /// Returns the first `DomainError::InvalidPolicyConfiguration` found.
    pub fn validate(&self) -> DomainResult<()> {
        for rule in &self.validations {
            rule.predicate()?;
        }
        if let Some(policy) = self.active_retry()
            && policy.producer.is_none()
        {
            policy.termination_predicate()?;
        }
        Ok(())
    }
}
