//! Wait primitive port

use std::time::Duration;

use async_trait::async_trait;

/// Port for blocking delays between exchanges.
///
/// Abstracted so tests can observe requested waits without sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Waits for the full duration. A zero duration returns immediately.
    async fn sleep(&self, duration: Duration);
}
