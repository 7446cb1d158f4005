//! Per-run response store.

use std::collections::HashMap;

use ricochet_domain::Response;

use crate::error::{ApplicationError, ApplicationResult};

/// Captured responses for one run, addressable by name and by recency.
///
/// Each run owns a fresh context; it is never shared between runs.
#[derive(Debug, Clone, Default)]
pub struct ResponseContext {
    named: HashMap<String, Response>,
    last: Option<Response>,
}

impl ResponseContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a response under `name`, replacing any previous entry, and
    /// makes it the last response.
    pub fn store(&mut self, name: impl Into<String>, response: Response) {
        self.named.insert(name.into(), response.clone());
        self.last = Some(response);
    }

    /// Replaces the last response without touching named entries.
    pub fn set_last(&mut self, response: Response) {
        self.last = Some(response);
    }

    /// Returns the response stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::NotFound` if nothing is stored under `name`.
    pub fn get(&self, name: &str) -> ApplicationResult<&Response> {
        self.named
            .get(name)
            .ok_or_else(|| ApplicationError::NotFound(format!("response '{name}'")))
    }

    /// Returns the most recently captured response, if any.
    #[must_use]
    pub const fn last(&self) -> Option<&Response> {
        self.last.as_ref()
    }

    /// Number of distinct named entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.named.len()
    }

    /// Returns true if a response is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Names of stored responses, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.named.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
