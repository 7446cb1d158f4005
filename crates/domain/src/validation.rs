//! Response predicates and validation rules.
//!
//! A single [`Predicate`] evaluator backs both consumers: retry policies use
//! it to decide when a retry loop terminates, and [`ValidationRule`]s use it
//! for pass/fail assertions on the final response.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::response::Response;

/// The four kinds of response predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    /// Response status equals the expected integer.
    StatusCodeEquals,
    /// Response body equals the expected string exactly.
    BodyEquals,
    /// Response body contains the expected string (ordinal, case-sensitive).
    BodyIncludes,
    /// Response body does not contain the expected string.
    BodyDoesNotInclude,
}

impl PredicateKind {
    /// Returns the snake-case identifier used in plan files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusCodeEquals => "status_code_equals",
            Self::BodyEquals => "body_equals",
            Self::BodyIncludes => "body_includes",
            Self::BodyDoesNotInclude => "body_does_not_include",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredicateKind {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "status_code_equals" => Ok(Self::StatusCodeEquals),
            "body_equals" => Ok(Self::BodyEquals),
            "body_includes" => Ok(Self::BodyIncludes),
            "body_does_not_include" => Ok(Self::BodyDoesNotInclude),
            _ => Err(DomainError::UnsupportedPredicate(s.to_string())),
        }
    }
}

/// A predicate compiled from a kind and an expected value.
///
/// Compilation is where configuration errors surface: a non-numeric
/// expected status is rejected here, before any exchange is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Status must equal this code. Values outside the HTTP range never match.
    StatusCodeEquals(i64),
    /// Body must equal this string.
    BodyEquals(String),
    /// Body must contain this substring.
    BodyIncludes(String),
    /// Body must not contain this substring.
    BodyDoesNotInclude(String),
}

impl Predicate {
    /// Compiles a predicate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPolicyConfiguration` if `kind` is
    /// `StatusCodeEquals` and `expected` does not parse as an integer.
    pub fn compile(kind: PredicateKind, expected: &str) -> DomainResult<Self> {
        match kind {
            PredicateKind::StatusCodeEquals => expected
                .trim()
                .parse::<i64>()
                .map(Self::StatusCodeEquals)
                .map_err(|_| {
                    DomainError::InvalidPolicyConfiguration(format!(
                        "expected status code must be an integer, got '{expected}'"
                    ))
                }),
            PredicateKind::BodyEquals => Ok(Self::BodyEquals(expected.to_string())),
            PredicateKind::BodyIncludes => Ok(Self::BodyIncludes(expected.to_string())),
            PredicateKind::BodyDoesNotInclude => {
                Ok(Self::BodyDoesNotInclude(expected.to_string()))
            }
        }
    }

    /// Evaluates the predicate against a response.
    #[must_use]
    pub fn evaluate(&self, response: &Response) -> Verdict {
        match self {
            Self::StatusCodeEquals(expected) => {
                if i64::from(response.status) == *expected {
                    Verdict::satisfied("Expected status code is correct.")
                } else {
                    Verdict::unsatisfied(format!(
                        "Expected status code is not correct. Expected: {expected} Actual: {}",
                        response.status
                    ))
                }
            }
            Self::BodyEquals(expected) => {
                if response.body == *expected {
                    Verdict::satisfied("Expected body is correct.")
                } else {
                    Verdict::unsatisfied(format!(
                        "Expected body is not correct. Expected: {expected} Actual: {}",
                        response.body
                    ))
                }
            }
            Self::BodyIncludes(expected) => {
                if response.body.contains(expected.as_str()) {
                    Verdict::satisfied("Body includes expected value.")
                } else {
                    Verdict::unsatisfied(format!(
                        "Body does not include expected value. Expected: {expected} Actual: {}",
                        response.body
                    ))
                }
            }
            Self::BodyDoesNotInclude(unwanted) => {
                if response.body.contains(unwanted.as_str()) {
                    Verdict::unsatisfied(format!("Body includes unwanted value: {unwanted}"))
                } else {
                    Verdict::satisfied("Body correctly does not include unwanted value.")
                }
            }
        }
    }
}

/// Outcome of evaluating a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the predicate held.
    pub satisfied: bool,
    /// Human-readable explanation.
    pub message: String,
}

impl Verdict {
    /// Creates a satisfied verdict.
    #[must_use]
    pub fn satisfied(message: impl Into<String>) -> Self {
        Self {
            satisfied: true,
            message: message.into(),
        }
    }

    /// Creates an unsatisfied verdict.
    #[must_use]
    pub fn unsatisfied(message: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            message: message.into(),
        }
    }
}

/// A pass/fail assertion applied to the final response of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Predicate kind.
    pub kind: PredicateKind,
    /// Expected value, interpreted according to `kind`.
    pub expected: String,
}

impl ValidationRule {
    /// Creates a new validation rule.
    #[must_use]
    pub fn new(kind: PredicateKind, expected: impl Into<String>) -> Self {
        Self {
            kind,
            expected: expected.into(),
        }
    }

    /// Shorthand for a `StatusCodeEquals` rule.
    #[must_use]
    pub fn status(code: u16) -> Self {
        Self::new(PredicateKind::StatusCodeEquals, code.to_string())
    }

    /// Compiles this rule into a predicate.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPolicyConfiguration` if the rule cannot be evaluated.
    pub fn predicate(&self) -> DomainResult<Predicate> {
        Predicate::compile(self.kind, &self.expected)
    }

    /// Human-readable description of the rule.
    #[must_use]
    pub fn description(&self) -> String {
        match self.kind {
            PredicateKind::StatusCodeEquals => format!("Status code = {}", self.expected),
            PredicateKind::BodyEquals => "Body equals expected".to_string(),
            PredicateKind::BodyIncludes => format!("Body includes '{}'", self.expected),
            PredicateKind::BodyDoesNotInclude => {
                format!("Body does not include '{}'", self.expected)
            }
        }
    }
}

/// Result of applying one validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The rule that was applied.
    pub rule: ValidationRule,
    /// Whether the rule held.
    pub passed: bool,
    /// Explanation from the evaluator.
    pub message: String,
}

impl ValidationResult {
    /// Builds a result from a rule and the verdict of its predicate.
    #[must_use]
    pub fn from_verdict(rule: ValidationRule, verdict: Verdict) -> Self {
        Self {
            rule,
            passed: verdict.satisfied,
            message: verdict.message,
        }
    }
}
