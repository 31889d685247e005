//! # Outcome Classification
//!
//! Collapses a [`ValidationOutcome`] to one of three display tiers. The
//! message is always the outcome's display text, so a `Fail` carries the
//! violation reason verbatim.

use std::fmt;

use serde::Serialize;

use crate::validate::ValidationOutcome;

/// Severity tier of a classified record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The record conforms to its schema.
    Pass,
    /// The record could not be judged: unknown collection or empty payload.
    Warn,
    /// The record violates its schema.
    Fail,
}

impl Tier {
    /// Lowercase name (`pass`, `warn`, `fail`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tier plus the human-readable message to show with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: Tier,
    pub message: String,
}

/// Classify a validation outcome.
pub fn classify(outcome: &ValidationOutcome) -> Classification {
    let tier = match outcome {
        ValidationOutcome::Valid => Tier::Pass,
        ValidationOutcome::UnknownCollection | ValidationOutcome::EmptyPayload => Tier::Warn,
        ValidationOutcome::Invalid(_) => Tier::Fail,
    };
    Classification {
        tier,
        message: outcome.to_string(),
    }
}

impl From<&ValidationOutcome> for Classification {
    fn from(outcome: &ValidationOutcome) -> Self {
        classify(outcome)
    }
}
