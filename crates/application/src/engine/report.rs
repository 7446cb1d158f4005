//! Run and per-request reports.

use chrono::{DateTime, Utc};
use ricochet_domain::{HttpMethod, Outcome, RequestSpec, RetryState, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed exchange, as passed to `RunHooks::after_exchange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Zero-based position of the request in the run.
    pub spec_index: usize,
    /// One-based attempt number within the request.
    pub attempt: u32,
    /// Response status.
    pub status: u16,
    /// Exchange duration in milliseconds.
    pub duration_ms: u64,
}

/// What happened to one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecReport {
    /// Zero-based position in the run.
    pub index: usize,
    /// Request name, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL.
    pub url: String,
    /// Number of exchanges issued.
    pub exchanges: u32,
    /// How the retry loop ended.
    pub retry: RetryState,
    /// Status of the final response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_status: Option<u16>,
    /// Validation results, in declaration order.
    #[serde(default)]
    pub validations: Vec<ValidationResult>,
    /// First failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Transport error that aborted the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_error: Option<String>,
    /// Request outcome.
    pub outcome: Outcome,
    /// Wall-clock time spent on the request, waits included.
    pub duration_ms: u64,
}

impl SpecReport {
    /// Creates an empty, passing report for a request.
    #[must_use]
    pub fn new(index: usize, spec: &RequestSpec) -> Self {
        Self {
            index,
            name: spec.name.clone(),
            method: spec.method,
            url: spec.url.clone(),
            exchanges: 0,
            retry: RetryState::NotConfigured,
            final_status: None,
            validations: Vec::new(),
            failure: None,
            transport_error: None,
            outcome: Outcome::Pass,
            duration_ms: 0,
        }
    }

    /// Marks the request failed, keeping the first failure message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.outcome = Outcome::Fail;
        if self.failure.is_none() {
            self.failure = Some(message.into());
        }
    }

    /// Display label: the name if set, otherwise `METHOD url`.
    #[must_use]
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.url))
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Aggregate outcome.
    pub outcome: Outcome,
    /// Per-request reports, in execution order.
    #[serde(default)]
    pub specs: Vec<SpecReport>,
    /// Free-form comments from hooks and the final comment producer.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Whether the run stopped early on cancellation.
    #[serde(default)]
    pub cancelled: bool,
}

impl RunReport {
    /// Starts a report.
    #[must_use]
    pub fn start(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            started_at,
            finished_at: None,
            outcome: Outcome::Pass,
            specs: Vec::new(),
            comments: Vec::new(),
            cancelled: false,
        }
    }

    /// Returns true if the run passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.outcome.is_pass()
    }

    /// Total exchanges issued across all requests.
    #[must_use]
    pub fn total_exchanges(&self) -> u32 {
        self.specs.iter().map(|s| s.exchanges).sum()
    }

    /// Requests whose outcome is `Fail`.
    pub fn failed_specs(&self) -> impl Iterator<Item = &SpecReport> {
        self.specs.iter().filter(|s| !s.outcome.is_pass())
    }

    /// Requests whose retry loop was exhausted.
    pub fn exhausted_specs(&self) -> impl Iterator<Item = &SpecReport> {
        self.specs.iter().filter(|s| s.retry.is_exhausted())
    }
}
