//! Extension points around a run.

use ricochet_domain::RequestSpec;
use thiserror::Error;

use super::report::{ExchangeRecord, RunReport};

/// Error raised by a hook. A failing hook marks the run as failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(String);

impl HookError {
    /// Creates a hook error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Callbacks invoked by the engine. Every method defaults to a no-op.
pub trait RunHooks: Send + Sync {
    /// Called once before the first request.
    ///
    /// # Errors
    ///
    /// A returned error is recorded as `Startup failed: ...` and fails the
    /// run, but the requests still execute.
    fn before_run(&self, _requests: &[RequestSpec]) -> Result<(), HookError> {
        Ok(())
    }

    /// Called after every completed exchange, including each retry attempt.
    fn after_exchange(&self, _exchange: &ExchangeRecord) {}

    /// Called once after the last request.
    ///
    /// # Errors
    ///
    /// A returned error is recorded as `Cleanup failed: ...` and fails the run.
    fn after_run(&self, _report: &RunReport) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl RunHooks for NoopHooks {}
