//! Request execution engine.
//!
//! Walks an ordered sequence of requests. Each request is issued once, or
//! repeatedly under its retry policy until the termination predicate holds
//! or the attempts run out. The final response is stored in the run's
//! [`ResponseContext`] and checked against the request's validation rules.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ricochet_domain::{
    OutcomeAccumulator, Predicate, RequestPlan, RequestSpec, Response, RetryPolicy, RetryState,
    ValidationResult, ValidationRule, ValueProducer,
};
use tracing::{debug, info, warn};

use super::config::{EngineConfig, TransportFailurePolicy};
use super::hooks::{NoopHooks, RunHooks};
use super::report::{ExchangeRecord, RunReport, SpecReport};
use crate::context::ResponseContext;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{CancellationReceiver, Clock, HttpTransport, Sleeper, TransportError};

/// Everything a finished run produces.
#[derive(Debug)]
pub struct RunOutput {
    /// Outcome and per-request details.
    pub report: RunReport,
    /// Responses captured during the run.
    pub context: ResponseContext,
}

/// Executes request sequences against an [`HttpTransport`].
///
/// # Example
///
/// ```ignore
/// let engine = RequestExecutionEngine::new(
///     Arc::new(ReqwestTransport::new(TransportSettings::default())?),
///     Arc::new(TokioSleeper),
///     Arc::new(SystemClock::new()),
/// );
///
/// let output = engine.run_plan(&plan).await?;
/// assert!(output.report.passed());
/// ```
pub struct RequestExecutionEngine<T: HttpTransport, S: Sleeper> {
    transport: Arc<T>,
    sleeper: Arc<S>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    hooks: Box<dyn RunHooks>,
    final_comment: Option<ValueProducer>,
    cancellation: Option<CancellationReceiver>,
}

type Completed = (Response, RetryState);

impl<T: HttpTransport, S: Sleeper> RequestExecutionEngine<T, S> {
    /// Creates an engine with default configuration and no hooks.
    pub fn new(transport: Arc<T>, sleeper: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transport,
            sleeper,
            clock,
            config: EngineConfig::default(),
            hooks: Box::new(NoopHooks),
            final_comment: None,
            cancellation: None,
        }
    }

    /// Sets the engine configuration.
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs run hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: impl RunHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    /// Adds a comment to every run report, produced after the last request.
    #[must_use]
    pub fn with_final_comment(
        mut self,
        producer: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.final_comment = Some(ValueProducer::new(producer));
        self
    }

    /// Stops runs early once the receiver observes cancellation.
    ///
    /// Cancellation is checked between requests, never mid-exchange.
    #[must_use]
    pub fn with_cancellation(mut self, receiver: CancellationReceiver) -> Self {
        self.cancellation = Some(receiver);
        self
    }

    /// Runs every request of a plan in order.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub async fn run_plan(&self, plan: &RequestPlan) -> ApplicationResult<RunOutput> {
        info!(plan = %plan.name, "running plan");
        self.run(&plan.requests).await
    }

    /// Runs the requests in order and aggregates a sticky pass/fail outcome.
    ///
    /// A failing request never stops the sequence. Transport failures are
    /// recorded against the request unless the configuration says to abort
    /// the run.
    ///
    /// # Errors
    ///
    /// - `ApplicationError::InvalidPolicyConfiguration` if a request's rules
    ///   or retry policy cannot be evaluated; raised before that request
    ///   issues any exchange.
    /// - `ApplicationError::Transport` if an exchange fails under
    ///   `TransportFailurePolicy::AbortRun`.
    pub async fn run(&self, requests: &[RequestSpec]) -> ApplicationResult<RunOutput> {
        let mut report = RunReport::start(self.clock.now());
        let mut context = ResponseContext::new();
        let mut outcome = OutcomeAccumulator::new();

        info!(run_id = %report.id, requests = requests.len(), "starting run");

        if let Err(e) = self.hooks.before_run(requests) {
            warn!(error = %e, "startup hook failed");
            outcome.fail();
            report.comments.push(format!("Startup failed: {e}"));
        }

        for (index, spec) in requests.iter().enumerate() {
            if self.is_cancelled() {
                warn!(remaining = requests.len() - index, "run cancelled");
                report.cancelled = true;
                outcome.fail();
                break;
            }

            let spec_report = self.execute_spec(index, spec, &mut context).await?;
            outcome.record(spec_report.outcome);
            report.specs.push(spec_report);
        }

        if let Some(producer) = &self.final_comment {
            report.comments.push(producer.produce());
        }
        report.outcome = outcome.outcome();

        if let Err(e) = self.hooks.after_run(&report) {
            warn!(error = %e, "cleanup hook failed");
            outcome.fail();
            report.comments.push(format!("Cleanup failed: {e}"));
        }

        report.outcome = outcome.outcome();
        report.finished_at = Some(self.clock.now());

        info!(
            run_id = %report.id,
            outcome = %report.outcome,
            exchanges = report.total_exchanges(),
            "run finished"
        );

        Ok(RunOutput { report, context })
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationReceiver::is_cancelled)
    }

    async fn execute_spec(
        &self,
        index: usize,
        spec: &RequestSpec,
        context: &mut ResponseContext,
    ) -> ApplicationResult<SpecReport> {
        let started = Instant::now();
        let label = spec.label();
        let mut report = SpecReport::new(index, spec);

        let invalid = |source| ApplicationError::InvalidPolicyConfiguration {
            spec: label.clone(),
            source,
        };

        let rules = spec
            .validations
            .iter()
            .map(|rule| rule.predicate().map(|predicate| (rule, predicate)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        // The expected value is resolved here, once per execution.
        let termination = spec
            .active_retry()
            .map(|policy| {
                policy
                    .termination_predicate()
                    .map(|predicate| (policy, predicate))
            })
            .transpose()
            .map_err(invalid)?;

        let completed = match &termination {
            Some((policy, predicate)) => {
                self.issue_with_retries(index, spec, policy, predicate, &mut report, context)
                    .await
            }
            None => self.issue_once(index, spec, &mut report, context).await,
        };

        match completed {
            Ok((response, retry)) => {
                report.retry = retry;
                report.final_status = Some(response.status);
                Self::apply_validations(&rules, &response, &mut report, &label);
                match &spec.name {
                    Some(name) => context.store(name.clone(), response),
                    None => context.set_last(response),
                }
            }
            Err(error) => {
                warn!(request = %label, error = %error, "transport failure");
                if self.config.transport_failure == TransportFailurePolicy::AbortRun {
                    return Err(ApplicationError::Transport {
                        spec: label,
                        source: error,
                    });
                }
                report.transport_error = Some(error.to_string());
                report.fail(format!("Transport failure: {error}"));
            }
        }

        report.duration_ms = millis(started.elapsed());
        debug!(request = %label, outcome = %report.outcome, "request finished");
        Ok(report)
    }

    async fn issue_once(
        &self,
        index: usize,
        spec: &RequestSpec,
        report: &mut SpecReport,
        context: &mut ResponseContext,
    ) -> Result<Completed, TransportError> {
        if spec.wait_ms > 0 {
            debug!(request = %spec.label(), wait_ms = spec.wait_ms, "waiting before request");
            self.sleeper.sleep(Duration::from_millis(spec.wait_ms)).await;
        }

        let response = self.exchange(index, 1, spec, report, context).await?;
        Ok((response, RetryState::NotConfigured))
    }

    async fn issue_with_retries(
        &self,
        index: usize,
        spec: &RequestSpec,
        policy: &RetryPolicy,
        predicate: &Predicate,
        report: &mut SpecReport,
        context: &mut ResponseContext,
    ) -> Result<Completed, TransportError> {
        let max_attempts = policy.max_attempts();
        let mut attempt = 1;

        loop {
            let response = self.exchange(index, attempt, spec, report, context).await?;
            let verdict = predicate.evaluate(&response);

            if verdict.satisfied {
                debug!(request = %spec.label(), attempt, "retry condition met");
                return Ok((response, RetryState::Satisfied { attempt }));
            }

            if attempt >= max_attempts {
                warn!(
                    request = %spec.label(),
                    attempts = attempt,
                    until = %policy.until,
                    message = %verdict.message,
                    "retries exhausted"
                );
                return Ok((response, RetryState::Exhausted { attempts: attempt }));
            }

            debug!(
                request = %spec.label(),
                attempt,
                interval_ms = policy.interval_ms,
                message = %verdict.message,
                "retry condition not met"
            );
            self.sleeper.sleep(policy.interval()).await;
            attempt += 1;
        }
    }

    async fn exchange(
        &self,
        index: usize,
        attempt: u32,
        spec: &RequestSpec,
        report: &mut SpecReport,
        context: &mut ResponseContext,
    ) -> Result<Response, TransportError> {
        debug!(method = %spec.method, url = %spec.url, attempt, "issuing exchange");
        report.exchanges += 1;

        let response = self.transport.issue(spec).await?;
        debug!(status = response.status, attempt, "exchange completed");

        self.hooks.after_exchange(&ExchangeRecord {
            spec_index: index,
            attempt,
            status: response.status,
            duration_ms: millis(response.duration),
        });
        context.set_last(response.clone());
        Ok(response)
    }

    fn apply_validations(
        rules: &[(&ValidationRule, Predicate)],
        response: &Response,
        report: &mut SpecReport,
        label: &str,
    ) {
        for (rule, predicate) in rules {
            let verdict = predicate.evaluate(response);
            if !verdict.satisfied {
                warn!(
                    request = %label,
                    rule = %rule.description(),
                    message = %verdict.message,
                    "validation failed"
                );
                report.fail(verdict.message.clone());
            }
            report
                .validations
                .push(ValidationResult::from_verdict((*rule).clone(), verdict));
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
