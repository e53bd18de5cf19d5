//! Attempts and their terminal outcomes.

use chrono::{DateTime, Utc};
use gaiaval_state::ResponseCategory;
use serde::{Deserialize, Serialize};

/// One model invocation for an item, original or edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attempt {
    /// 1-based, strictly increasing within a session.
    pub number: u32,

    /// Validation steps sent with the question. Empty for the first attempt.
    pub steps: Vec<String>,

    /// Whether the steps were supplied through an edit.
    pub edited: bool,

    /// The model's raw answer (None when the invocation failed).
    pub answer: Option<String>,

    pub invoked_at: DateTime<Utc>,
}

impl Attempt {
    pub fn new(number: u32, steps: Vec<String>, edited: bool) -> Self {
        Self {
            number,
            steps,
            edited,
            answer: None,
            invoked_at: Utc::now(),
        }
    }
}

/// Terminal classification of an item's validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    CorrectAsIs,
    CorrectAfterSteps,
    WrongAnswer,
    /// The model could not be evaluated (invocation failed or timed out).
    Errored { reason: String },
}

impl Outcome {
    /// Persisted category for this outcome.
    pub fn category(&self) -> ResponseCategory {
        match self {
            Outcome::CorrectAsIs => ResponseCategory::CorrectAsIs,
            Outcome::CorrectAfterSteps => ResponseCategory::CorrectAfterSteps,
            Outcome::WrongAnswer => ResponseCategory::WrongAnswer,
            Outcome::Errored { .. } => ResponseCategory::Errored,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::CorrectAsIs | Outcome::CorrectAfterSteps)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Errored { reason } => write!(f, "errored ({reason})"),
            other => f.write_str(other.category().as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_maps_to_category() {
        assert_eq!(Outcome::CorrectAsIs.category(), ResponseCategory::CorrectAsIs);
        assert_eq!(
            Outcome::Errored {
                reason: "timeout".into()
            }
            .category(),
            ResponseCategory::Errored
        );
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::CorrectAfterSteps.to_string(), "correct after steps");
        assert_eq!(
            Outcome::Errored {
                reason: "boom".into()
            }
            .to_string(),
            "errored (boom)"
        );
    }

    #[test]
    fn outcome_serde_tagged() {
        let json = serde_json::to_value(Outcome::WrongAnswer).unwrap();
        assert_eq!(json, serde_json::json!({"type": "wrong_answer"}));
    }
}
