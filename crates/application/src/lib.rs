//! Ricochet Application - Engine and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the transport, waits and time)
//! - The per-run response context
//! - The retry-driven request execution engine
//! - Application-level error handling

pub mod context;
pub mod engine;
pub mod error;
pub mod ports;

pub use context::ResponseContext;
pub use engine::{
    EngineConfig, ExchangeRecord, HookError, NoopHooks, RequestExecutionEngine, RunHooks,
    RunOutput, RunReport, SpecReport, TransportFailurePolicy,
};
pub use error::{ApplicationError, ApplicationResult};
pub use ports::{
    CancellationReceiver, CancellationToken, Clock, HttpTransport, Sleeper, TransportError,
};
