//! Subcommand implementations.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ricochet_application::{CancellationReceiver, RequestExecutionEngine, RunReport};
use ricochet_domain::{Outcome, RetryState};
use ricochet_infrastructure::{
    LoadedPlan, ReqwestTransport, SystemClock, TokioSleeper, load_plan, write_json_stable,
};
use tracing::info;

use crate::cli::{CheckArgs, RunArgs};

/// Exit status for a run that passed.
pub const EXIT_PASS: u8 = 0;
/// Exit status for a run that completed with failures.
pub const EXIT_FAIL: u8 = 1;
/// Exit status for a plan that could not be run.
pub const EXIT_ERROR: u8 = 2;

/// Executes a plan file.
///
/// Command-line overrides replace the plan file's settings. The report is
/// written before returning when `--report` is set.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or is misconfigured, if the
/// run aborts on a transport failure, or if the report cannot be written.
pub async fn run(args: &RunArgs, cancellation: Option<CancellationReceiver>) -> Result<RunReport> {
    let LoadedPlan { plan, mut settings } = load(&args.plan).await?;

    if let Some(policy) = args.transport_failure {
        settings.engine.transport_failure = policy;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.transport = settings.transport.with_timeout_ms(timeout_ms);
    }

    plan.validate()
        .with_context(|| format!("plan '{}' is misconfigured", plan.name))?;

    let transport = ReqwestTransport::new(settings.transport)?;
    let mut engine = RequestExecutionEngine::new(
        Arc::new(transport),
        Arc::new(TokioSleeper::new()),
        Arc::new(SystemClock::new()),
    )
    .with_config(settings.engine);
    if let Some(receiver) = cancellation {
        engine = engine.with_cancellation(receiver);
    }

    let output = engine.run_plan(&plan).await?;

    if let Some(path) = &args.report {
        write_json_stable(path, &output.report)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }

    Ok(output.report)
}

/// Loads and checks a plan without sending requests.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or is misconfigured.
pub async fn check(args: &CheckArgs) -> Result<String> {
    let LoadedPlan { plan, .. } = load(&args.plan).await?;
    plan.validate()
        .with_context(|| format!("plan '{}' is misconfigured", plan.name))?;

    let mut summary = format!("plan '{}': {} request(s)\n", plan.name, plan.len());
    for (index, request) in plan.iter().enumerate() {
        let retry = request.active_retry().map_or_else(String::new, |policy| {
            format!(
                " (retry until {} up to {} times)",
                policy.until, policy.max_retries
            )
        });
        let _ = writeln!(summary, "  {:>2}. {}{retry}", index + 1, request.label());
    }
    Ok(summary)
}

async fn load(path: &Path) -> Result<LoadedPlan> {
    load_plan(path)
        .await
        .with_context(|| format!("failed to load plan {}", path.display()))
}

/// Maps a run outcome to a process exit status.
#[must_use]
pub const fn exit_status(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Pass => EXIT_PASS,
        Outcome::Fail => EXIT_FAIL,
    }
}

/// Renders a human-readable run summary.
#[must_use]
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    for spec in &report.specs {
        let retry = match spec.retry {
            RetryState::NotConfigured => String::new(),
            RetryState::Satisfied { attempt } => format!(", satisfied on attempt {attempt}"),
            RetryState::Exhausted { attempts } => format!(", retries exhausted after {attempts}"),
        };
        let status = spec
            .final_status
            .map_or_else(|| "---".to_string(), |s| s.to_string());
        let _ = writeln!(
            out,
            "{} {} {} ({} exchange(s){retry})",
            spec.outcome,
            status,
            spec.label(),
            spec.exchanges
        );
        if let Some(failure) = &spec.failure {
            let _ = writeln!(out, "       {failure}");
        }
    }
    for comment in &report.comments {
        let _ = writeln!(out, "# {comment}");
    }
    if report.cancelled {
        out.push_str("run cancelled before completion\n");
    }
    let _ = writeln!(
        out,
        "{}: {} request(s), {} failed, {} exchange(s)",
        report.outcome,
        report.specs.len(),
        report.failed_specs().count(),
        report.total_exchanges()
    );
    out
}
