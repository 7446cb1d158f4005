//! Ricochet Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus plan-file loading and
//! report serialization.

pub mod adapters;
pub mod config;
pub mod plan_file;
pub mod serialization;

pub use adapters::{ReqwestTransport, SystemClock, TokioSleeper};
pub use config::TransportSettings;
pub use plan_file::{LoadedPlan, PlanFileError, PlanFormat, PlanLoader, PlanSettings, load_plan};
pub use serialization::{
    SerializationError, from_json, to_json_stable, to_json_stable_bytes, write_json_stable,
};
