//! Tokio-backed sleeper

use std::time::Duration;

use async_trait::async_trait;
use ricochet_application::ports::Sleeper;

/// Suspends the current task with `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl TokioSleeper {
    /// Creates a new sleeper.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
