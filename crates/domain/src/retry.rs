//! Retry policy types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::validation::{Predicate, PredicateKind};

/// A zero-argument function producing the expected value of a retry policy.
///
/// Resolved once per request execution, not once per attempt.
#[derive(Clone)]
pub struct ValueProducer(Arc<dyn Fn() -> String + Send + Sync>);

impl ValueProducer {
    /// Wraps a closure.
    pub fn new(producer: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(producer))
    }

    /// Invokes the producer.
    #[must_use]
    pub fn produce(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for ValueProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueProducer(..)")
    }
}

/// Declarative retry configuration attached to a request.
///
/// With `max_retries = N > 0` the request is issued at most `N + 1` times,
/// stopping at the first response that satisfies the `until` predicate.
/// `interval_ms` is waited between attempts only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Termination predicate kind.
    pub until: PredicateKind,
    /// Static expected value; the fallback when no producer is set.
    pub expected: String,
    /// Optional deferred producer that takes precedence over `expected`.
    #[serde(skip)]
    pub producer: Option<ValueProducer>,
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Wait between attempts, in milliseconds.
    #[serde(default)]
    pub interval_ms: u64,
}

impl RetryPolicy {
    /// Creates a policy with a static expected value.
    #[must_use]
    pub fn new(
        until: PredicateKind,
        expected: impl Into<String>,
        max_retries: u32,
        interval_ms: u64,
    ) -> Self {
        Self {
            until,
            expected: expected.into(),
            producer: None,
            max_retries,
            interval_ms,
        }
    }

    /// Retries until the response status equals `code`.
    #[must_use]
    pub fn until_status(code: u16, max_retries: u32, interval_ms: u64) -> Self {
        Self::new(
            PredicateKind::StatusCodeEquals,
            code.to_string(),
            max_retries,
            interval_ms,
        )
    }

    /// Attaches a deferred value producer (builder pattern).
    #[must_use]
    pub fn with_producer(
        mut self,
        producer: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.producer = Some(ValueProducer::new(producer));
        self
    }

    /// Returns true if the policy drives a retry loop (`max_retries > 0`).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.max_retries > 0
    }

    /// Maximum number of exchanges this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait between attempts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Resolves the expected value, invoking the producer if present.
    #[must_use]
    pub fn resolve_expected(&self) -> String {
        self.producer
            .as_ref()
            .map_or_else(|| self.expected.clone(), ValueProducer::produce)
    }

    /// Resolves the expected value and compiles the termination predicate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPolicyConfiguration` if the resolved value
    /// cannot be evaluated for the policy's predicate kind.
    pub fn termination_predicate(&self) -> DomainResult<Predicate> {
        Predicate::compile(self.until, &self.resolve_expected())
    }
}

/// How a request's retry loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RetryState {
    /// No active retry policy; a single exchange was issued.
    NotConfigured,
    /// The termination predicate held on this 1-based attempt.
    Satisfied {
        /// Attempt number.
        attempt: u32,
    },
    /// Every attempt was used without the predicate holding.
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
    },
}

impl RetryState {
    /// Returns true if retries were exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
