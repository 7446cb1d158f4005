//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ricochet_application::TransportFailurePolicy;

/// Ricochet - run declared HTTP request plans with retries and assertions
#[derive(Parser, Debug)]
#[command(name = "ricochet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `ricochet_application=trace` (defaults to `RUST_LOG`, then `info`)
    #[arg(long, global = true, env = "RICOCHET_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a plan file and report the outcome
    Run(RunArgs),

    /// Load a plan file and check it without sending requests
    Check(CheckArgs),
}

/// Arguments for `ricochet run`.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Plan file (.yaml, .yml or .json)
    pub plan: PathBuf,

    /// Write the JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// What a transport failure does: abort-spec or abort-run
    #[arg(long, env = "RICOCHET_TRANSPORT_FAILURE")]
    pub transport_failure: Option<TransportFailurePolicy>,

    /// Default request timeout in milliseconds
    #[arg(long, env = "RICOCHET_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

impl RunArgs {
    /// Arguments for running `plan` with the plan file's own settings.
    #[must_use]
    pub fn new(plan: impl Into<PathBuf>) -> Self {
        Self {
            plan: plan.into(),
            report: None,
            transport_failure: None,
            timeout_ms: None,
        }
    }
}

/// Arguments for `ricochet check`.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Plan file (.yaml, .yml or .json)
    pub plan: PathBuf,
}
