//! Ricochet Domain - Core types
//!
//! This crate defines the domain model for the Ricochet request orchestrator:
//! declared requests, retry policies, response predicates and outcomes.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod outcome;
pub mod plan;
pub mod request;
pub mod response;
pub mod retry;
pub mod validation;

pub use error::{DomainError, DomainResult};
pub use outcome::{Outcome, OutcomeAccumulator};
pub use plan::RequestPlan;
pub use request::{Header, Headers, HttpMethod, RequestSpec};
pub use response::Response;
pub use retry::{RetryPolicy, RetryState, ValueProducer};
pub use validation::{Predicate, PredicateKind, ValidationResult, ValidationRule, Verdict};
