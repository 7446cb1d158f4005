//! Pass/fail outcome and its sticky accumulator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pass/fail verdict for a single request or a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Everything held.
    #[default]
    Pass,
    /// At least one failure was recorded.
    Fail,
}

impl Outcome {
    /// Returns true for `Pass`.
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// Aggregate outcome that may move from `Pass` to `Fail` but never back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeAccumulator {
    outcome: Outcome,
}

impl OutcomeAccumulator {
    /// Starts at `Pass`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outcome: Outcome::Pass,
        }
    }

    /// Records an outcome; only `Fail` has an effect.
    pub const fn record(&mut self, outcome: Outcome) {
        if let Outcome::Fail = outcome {
            self.outcome = Outcome::Fail;
        }
    }

    /// Records a failure.
    pub const fn fail(&mut self) {
        self.outcome = Outcome::Fail;
    }

    /// Current aggregate outcome.
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }
}
