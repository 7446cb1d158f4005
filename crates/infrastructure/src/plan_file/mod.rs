//! Request plans declared in YAML or JSON files.
//!
//! A plan file lists requests in execution order together with optional
//! engine and transport settings:
//!
//! ```yaml
//! name: smoke
//! settings:
//!   transport: { timeout_ms: 5000 }
//! requests:
//!   - name: health
//!     url: http://localhost:8080/health
//!     retry: { until: status_code_equals, expected: 200, max_retries: 2, interval_ms: 1000 }
//!     validate:
//!       - { kind: body_includes, expected: ok }
//! ```
//!
//! `expected_env` in a retry block defers the expected value to an
//! environment variable read when the request runs, with `expected` as the
//! fallback.

mod entry;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ricochet_application::EngineConfig;
use ricochet_domain::{DomainError, RequestPlan};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use entry::{EnvLookup, Scalar};
use entry::PlanDocument;

use crate::config::TransportSettings;
use crate::serialization::{SerializationError, from_json};

/// Errors raised while loading a plan file.
#[derive(Debug, Error)]
pub enum PlanFileError {
    /// The file could not be read.
    #[error("failed to read plan file {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file extension is neither YAML nor JSON.
    #[error("unsupported plan file extension: {}", .0.display())]
    UnknownFormat(PathBuf),

    /// The YAML document is malformed.
    #[error("invalid YAML plan: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document is malformed.
    #[error("invalid JSON plan: {0}")]
    Json(#[from] SerializationError),

    /// A request entry names an unknown method or predicate.
    #[error("invalid request #{position}: {source}")]
    InvalidRequest {
        /// One-based position of the entry.
        position: usize,
        /// Underlying domain error.
        source: DomainError,
    },
}

/// Plan document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    /// `.yaml` or `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl PlanFormat {
    /// Detects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Settings block of a plan file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanSettings {
    /// Engine behaviour.
    pub engine: EngineConfig,
    /// Transport adapter settings.
    pub transport: TransportSettings,
}

/// A parsed plan with its settings.
#[derive(Debug, Clone)]
pub struct LoadedPlan {
    /// Requests in execution order.
    pub plan: RequestPlan,
    /// Settings declared by the file.
    pub settings: PlanSettings,
}

/// Reads plan files.
#[derive(Clone)]
pub struct PlanLoader {
    env: EnvLookup,
}

impl fmt::Debug for PlanLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanLoader").finish_non_exhaustive()
    }
}

impl Default for PlanLoader {
    fn default() -> Self {
        Self {
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }
}

impl PlanLoader {
    /// Creates a loader that resolves `expected_env` from the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the environment lookup used by deferred expected values.
    #[must_use]
    pub fn with_env_lookup(
        mut self,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.env = Arc::new(lookup);
        self
    }

    /// Loads a plan from disk, picking the syntax from the extension.
    ///
    /// An unnamed plan takes the file stem as its name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an entry
    /// names an unknown method or predicate.
    pub async fn load(&self, path: &Path) -> Result<LoadedPlan, PlanFileError> {
        let format = PlanFormat::from_path(path)
            .ok_or_else(|| PlanFileError::UnknownFormat(path.to_path_buf()))?;
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| PlanFileError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut loaded = self.parse(&contents, format)?;
        if loaded.plan.name.is_empty()
            && let Some(stem) = path.file_stem()
        {
            loaded.plan.name = stem.to_string_lossy().into_owned();
        }

        debug!(
            path = %path.display(),
            plan = %loaded.plan.name,
            requests = loaded.plan.len(),
            "plan loaded"
        );
        Ok(loaded)
    }

    /// Parses plan text.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn parse(&self, contents: &str, format: PlanFormat) -> Result<LoadedPlan, PlanFileError> {
        let document: PlanDocument = match format {
            PlanFormat::Yaml => serde_yaml::from_str(contents)?,
            PlanFormat::Json => from_json(contents)?,
        };
        document.into_loaded(&self.env)
    }
}

/// Loads a plan file with the process environment.
///
/// # Errors
///
/// See [`PlanLoader::load`].
pub async fn load_plan(path: &Path) -> Result<LoadedPlan, PlanFileError> {
    PlanLoader::new().load(path).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ricochet_application::TransportFailurePolicy;
    use ricochet_domain::{HttpMethod, PredicateKind};

    const SMOKE: &str = r#"
name: smoke
settings:
  engine: { transport_failure: abort_run }
  transport: { timeout_ms: 5000 }
requests:
  - name: health
    url: http://localhost:8080/health
    headers: { Accept: application/json, X-Attempt: 1 }
    timeout_ms: 2000
    retry:
      until: status_code_equals
      expected: 200
      max_retries: 2
      interval_ms: 1000
    validate:
      - { kind: body_includes, expected: ok }
  - method: post
    url: http://localhost:8080/orders
    body: { sku: "A-1", quantity: 2 }
"#;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(PlanFormat::from_path(Path::new("a.yaml")), Some(PlanFormat::Yaml));
        assert_eq!(PlanFormat::from_path(Path::new("a.YML")), Some(PlanFormat::Yaml));
        assert_eq!(PlanFormat::from_path(Path::new("a.json")), Some(PlanFormat::Json));
        assert_eq!(PlanFormat::from_path(Path::new("a.toml")), None);
        assert_eq!(PlanFormat::from_path(Path::new("plan")), None);
    }

    #[test]
    fn test_parse_yaml_plan() {
        let loaded = PlanLoader::new().parse(SMOKE, PlanFormat::Yaml).unwrap();

        assert_eq!(loaded.plan.name, "smoke");
        assert_eq!(
            loaded.settings.engine.transport_failure,
            TransportFailurePolicy::AbortRun
        );
        assert_eq!(loaded.settings.transport.timeout_ms, 5000);
        assert_eq!(loaded.settings.transport.max_redirects, 10);

        let health = &loaded.plan.requests[0];
        assert_eq!(health.method, HttpMethod::Get);
        assert_eq!(health.headers.get("x-attempt"), Some("1"));
        assert_eq!(health.timeout_ms, Some(2000));
        let retry = health.active_retry().unwrap();
        assert_eq!(retry.until, PredicateKind::StatusCodeEquals);
        assert_eq!(retry.expected, "200");
        assert_eq!(retry.max_attempts(), 3);
        assert_eq!(health.validations[0].kind, PredicateKind::BodyIncludes);

        let order = &loaded.plan.requests[1];
        assert_eq!(order.method, HttpMethod::Post);
        assert_eq!(order.body.as_deref(), Some(r#"{"quantity":2,"sku":"A-1"}"#));
    }

    #[test]
    fn test_parse_json_plan() {
        let json = r#"{
            "requests": [
                {"url": "http://svc/a", "body": "raw text", "validate": [{"kind": "status_code_equals", "expected": "204"}]}
            ]
        }"#;
        let loaded = PlanLoader::new().parse(json, PlanFormat::Json).unwrap();

        assert_eq!(loaded.plan.name, "");
        assert_eq!(loaded.settings, PlanSettings::default());
        assert_eq!(loaded.plan.requests[0].body.as_deref(), Some("raw text"));
        assert_eq!(loaded.plan.requests[0].validations[0].expected, "204");
    }

    #[test]
    fn test_expected_env_is_deferred() {
        let yaml = r#"
requests:
  - url: http://svc/token
    retry: { until: body_equals, expected_env: TOKEN, expected: fallback, max_retries: 1 }
  - url: http://svc/other
    retry: { until: body_equals, expected_env: MISSING, expected: fallback, max_retries: 1 }
"#;
        let loaded = PlanLoader::new()
            .with_env_lookup(|name| (name == "TOKEN").then(|| "secret".to_string()))
            .parse(yaml, PlanFormat::Yaml)
            .unwrap();

        let token = loaded.plan.requests[0].active_retry().unwrap();
        assert_eq!(token.expected, "fallback");
        assert_eq!(token.resolve_expected(), "secret");

        let other = loaded.plan.requests[1].active_retry().unwrap();
        assert_eq!(other.resolve_expected(), "fallback");
    }

    #[test]
    fn test_unknown_predicate_reports_position() {
        let yaml = r"
requests:
  - url: http://svc/a
  - url: http://svc/b
    validate:
      - { kind: header_equals, expected: x }
";
        let err = PlanLoader::new().parse(yaml, PlanFormat::Yaml).unwrap_err();
        assert!(matches!(
            err,
            PlanFileError::InvalidRequest {
                position: 2,
                source: DomainError::UnsupportedPredicate(_)
            }
        ));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let yaml = "requests:\n  - method: FETCH\n    url: http://svc/a\n";
        let err = PlanLoader::new().parse(yaml, PlanFormat::Yaml).unwrap_err();
        assert!(matches!(
            err,
            PlanFileError::InvalidRequest {
                source: DomainError::UnsupportedMethod(_),
                ..
            }
        ));
    }

    #[test]
    fn test_retry_without_expected_value_is_rejected() {
        let yaml = "requests:\n  - url: http://svc/a\n    retry: { until: body_equals, max_retries: 2 }\n";
        let err = PlanLoader::new().parse(yaml, PlanFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("expected_env"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let yaml = "requests:\n  - url: http://svc/a\n    retries: 3\n";
        let err = PlanLoader::new().parse(yaml, PlanFormat::Yaml).unwrap_err();
        assert!(matches!(err, PlanFileError::Yaml(_)));
    }

    #[test]
    fn test_non_numeric_status_loads_but_fails_validation() {
        let yaml = "requests:\n  - url: http://svc/a\n    validate: [{ kind: status_code_equals, expected: abc }]\n";
        let loaded = PlanLoader::new().parse(yaml, PlanFormat::Yaml).unwrap();
        assert!(loaded.plan.validate().is_err());
    }
}
