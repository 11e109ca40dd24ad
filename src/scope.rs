use serde::Serialize;

use crate::error::{Error, Result};

/// The analytical lens for a report: which filter applies to the dataset
/// and which narrative framing the prompt carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Planning,
    Execution,
    SprintReview,
    Delivery,
    Risk,
    Team,
}

impl Scope {
    /// Parse a scope tag. Accepts either `sprint_review` or `sprint-review`
    /// spelling; everything else is case-insensitive exact.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(Scope::Planning),
            "execution" => Ok(Scope::Execution),
            "sprint_review" | "sprint-review" => Ok(Scope::SprintReview),
            "delivery" => Ok(Scope::Delivery),
            "risk" => Ok(Scope::Risk),
            "team" => Ok(Scope::Team),
            other => Err(Error::InvalidScope(other.to_string())),
        }
    }

    /// Canonical tag string, matching the CLI spelling.
    pub fn as_key(&self) -> &'static str {
        match self {
            Scope::Planning => "planning",
            Scope::Execution => "execution",
            Scope::SprintReview => "sprint_review",
            Scope::Delivery => "delivery",
            Scope::Risk => "risk",
            Scope::Team => "team",
        }
    }

    /// Human-facing report title for the scope.
    pub fn title(&self) -> &'static str {
        match self {
            Scope::Planning => "Initial Planning Quality",
            Scope::Execution => "Execution Monitoring Report",
            Scope::SprintReview => "Stakeholder Sprint Review Report",
            Scope::Delivery => "Close-out Summary",
            Scope::Risk => "Risk Assessment",
            Scope::Team => "Team Performance Review",
        }
    }

    /// All scopes, in the order they are presented to users.
    pub fn all() -> &'static [Scope] {
        &[
            Scope::Planning,
            Scope::Execution,
            Scope::SprintReview,
            Scope::Delivery,
            Scope::Risk,
            Scope::Team,
        ]
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}
