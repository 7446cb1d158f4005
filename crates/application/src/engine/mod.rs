//! Retry-driven request execution.

mod config;
mod hooks;
mod report;
mod runner;

pub use config::{EngineConfig, TransportFailurePolicy};
pub use hooks::{HookError, NoopHooks, RunHooks};
pub use report::{ExchangeRecord, RunReport, SpecReport};
pub use runner::{RequestExecutionEngine, RunOutput};
