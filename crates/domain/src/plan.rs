//! Ordered collection of declared requests.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::RequestSpec;

/// An ordered sequence of requests executed as one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestPlan {
    /// Plan name, used in logs and reports.
    #[serde(default)]
    pub name: String,
    /// Requests in execution order.
    #[serde(default)]
    pub requests: Vec<RequestSpec>,
}

impl RequestPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requests: Vec::new(),
        }
    }

    /// Appends a request.
    pub fn add(&mut self, request: RequestSpec) {
        self.requests.push(request);
    }

    /// Appends a request (builder pattern).
    #[must_use]
    pub fn with_request(mut self, request: RequestSpec) -> Self {
        self.requests.push(request);
        self
    }

    /// Iterates requests in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &RequestSpec> {
        self.requests.iter()
    }

    /// Number of requests.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.requests.len()
    }

    /// Returns true if the plan has no requests.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Checks every request up front.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error, prefixed with the request's
    /// position and label.
    pub fn validate(&self) -> DomainResult<()> {
        for (index, request) in self.requests.iter().enumerate() {
            request.validate().map_err(|e| match e {
                DomainError::InvalidPolicyConfiguration(reason) => {
                    DomainError::InvalidPolicyConfiguration(format!(
                        "request #{} ({}): {reason}",
                        index + 1,
                        request.label()
                    ))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a RequestPlan {
    type Item = &'a RequestSpec;
    type IntoIter = std::slice::Iter<'a, RequestSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.iter()
    }
}
