//! Engine configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the engine does when an exchange fails at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportFailurePolicy {
    /// Record the request as failed and continue with the next one.
    #[default]
    AbortSpec,
    /// Stop the run and return the transport error to the caller.
    AbortRun,
}

impl fmt::Display for TransportFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbortSpec => f.write_str("abort_spec"),
            Self::AbortRun => f.write_str("abort_run"),
        }
    }
}

impl FromStr for TransportFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "abort_spec" => Ok(Self::AbortSpec),
            "abort_run" => Ok(Self::AbortRun),
            other => Err(format!(
                "unknown transport failure policy '{other}' (expected abort_spec or abort_run)"
            )),
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Handling of transport failures.
    pub transport_failure: TransportFailurePolicy,
}

impl EngineConfig {
    /// Sets the transport failure policy (builder pattern).
    #[must_use]
    pub const fn with_transport_failure(mut self, policy: TransportFailurePolicy) -> Self {
        self.transport_failure = policy;
        self
    }
}
