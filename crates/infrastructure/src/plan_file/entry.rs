//! Serde shapes of a plan document and their conversion to domain types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ricochet_domain::{
    DomainError, DomainResult, HttpMethod, PredicateKind, RequestPlan, RequestSpec, RetryPolicy,
};
use serde::Deserialize;

use super::{LoadedPlan, PlanFileError, PlanSettings};

/// Looks up an environment variable by name.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A scalar that may be written unquoted in YAML, e.g. `expected: 200`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Quoted or bare text.
    Text(String),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// Boolean literal.
    Flag(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct PlanDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    settings: PlanSettings,
    #[serde(default)]
    requests: Vec<RequestEntry>,
}

impl PlanDocument {
    pub(super) fn into_loaded(self, env: &EnvLookup) -> Result<LoadedPlan, PlanFileError> {
        let mut plan = RequestPlan::new(self.name.unwrap_or_default());
        for (index, entry) in self.requests.into_iter().enumerate() {
            let spec = entry
                .into_spec(env)
                .map_err(|source| PlanFileError::InvalidRequest {
                    position: index + 1,
                    source,
                })?;
            plan.add(spec);
        }
        Ok(LoadedPlan {
            plan,
            settings: self.settings,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RequestEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    method: Option<String>,
    url: String,
    #[serde(default)]
    headers: BTreeMap<String, Scalar>,
    /// Text is sent verbatim; structured values are sent as JSON.
    #[serde(default)]
    body: Option<serde_json::Value>,
    #[serde(default)]
    wait_ms: u64,
    #[serde(default)]
    timeout_ms: Option<u64>,
    #[serde(default)]
    retry: Option<RetryEntry>,
    #[serde(default)]
    validate: Vec<ValidationEntry>,
}

impl RequestEntry {
    fn into_spec(self, env: &EnvLookup) -> DomainResult<RequestSpec> {
        let method = match &self.method {
            Some(method) => HttpMethod::from_str(method)?,
            None => HttpMethod::Get,
        };

        let mut spec = RequestSpec::new(method, self.url).with_wait_ms(self.wait_ms);
        spec.name = self.name;
        spec.timeout_ms = self.timeout_ms;

        for (name, value) in self.headers {
            spec = spec.with_header(name, value.to_string());
        }

        spec.body = self.body.map(|body| match body {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        });

        if let Some(retry) = self.retry {
            spec = spec.with_retry_policy(retry.into_policy(env)?);
        }

        for rule in self.validate {
            let kind = PredicateKind::from_str(&rule.kind)?;
            spec = spec.with_validation(kind, rule.expected.to_string());
        }

        Ok(spec)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RetryEntry {
    until: String,
    #[serde(default)]
    expected: Option<Scalar>,
    #[serde(default)]
    expected_env: Option<String>,
    #[serde(default)]
    max_retries: u32,
    #[serde(default)]
    interval_ms: u64,
}

impl RetryEntry {
    fn into_policy(self, env: &EnvLookup) -> DomainResult<RetryPolicy> {
        let until = PredicateKind::from_str(&self.until)?;
        let fallback = self.expected.map(|value| value.to_string());

        match (self.expected_env, fallback) {
            (Some(variable), fallback) => {
                let fallback = fallback.unwrap_or_default();
                let lookup = Arc::clone(env);
                let static_value = fallback.clone();
                Ok(
                    RetryPolicy::new(until, static_value, self.max_retries, self.interval_ms)
                        .with_producer(move || lookup(&variable).unwrap_or_else(|| fallback.clone())),
                )
            }
            (None, Some(expected)) => Ok(RetryPolicy::new(
                until,
                expected,
                self.max_retries,
                self.interval_ms,
            )),
            (None, None) => Err(DomainError::InvalidPolicyConfiguration(
                "retry needs `expected` or `expected_env`".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidationEntry {
    kind: String,
    expected: Scalar,
}
