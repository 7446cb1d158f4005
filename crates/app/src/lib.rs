//! Ricochet command-line front end.
//!
//! The binary parses arguments, installs tracing, wires Ctrl-C to run
//! cancellation and maps the aggregate outcome to the exit status. The
//! pieces live here so they can be exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod telemetry;

pub use cli::{CheckArgs, Cli, Commands, RunArgs};
