//! Outcome classification.
//!
//! Compares a model answer against the item's predefined answer. A match is
//! exact string equality after trimming and, unless the policy is case
//! sensitive, full Unicode case folding (`Straße` matches `STRASSE`). A mismatch is reported as [`Verdict::NoMatch`];
//! only the session decides when a mismatch becomes a terminal wrong answer.

use serde::{Deserialize, Serialize};

use crate::domain::ClassifyError;

/// How answers are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    pub case_sensitive: bool,
}

/// Result of classifying a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    CorrectAsIs,
    CorrectAfterSteps,
    /// Provisional: not terminal until the session rules out a retry.
    NoMatch,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::CorrectAsIs => "correct_as_is",
            Verdict::CorrectAfterSteps => "correct_after_steps",
            Verdict::NoMatch => "no_match",
        }
    }
}

/// Canonical comparison form of an answer.
pub fn normalize(text: &str, policy: MatchPolicy) -> String {
    let trimmed = text.trim();
    if policy.case_sensitive {
        trimmed.to_string()
    } else {
        caseless::default_case_fold_str(trimmed)
    }
}

/// Reject items whose predefined answer is absent or blank.
pub fn check_predefined(predefined_answer: &str) -> Result<(), ClassifyError> {
    if predefined_answer.trim().is_empty() {
        return Err(ClassifyError::MissingPredefinedAnswer);
    }
    Ok(())
}

pub fn classify(
    model_answer: &str,
    predefined_answer: &str,
    is_edited_attempt: bool,
    had_prior_non_match: bool,
    policy: MatchPolicy,
) -> Result<Verdict, ClassifyError> {
    check_predefined(predefined_answer)?;
    if is_edited_attempt && !had_prior_non_match {
        return Err(ClassifyError::InconsistentHistory);
    }

    let answer = normalize(model_answer, policy);
    if answer.is_empty() || answer != normalize(predefined_answer, policy) {
        return Ok(Verdict::NoMatch);
    }

    if is_edited_attempt {
        Ok(Verdict::CorrectAfterSteps)
    } else {
        Ok(Verdict::CorrectAsIs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOLD: MatchPolicy = MatchPolicy {
        case_sensitive: false,
    };

    #[test]
    fn trailing_whitespace_and_case_match() {
        assert_eq!(
            classify("paris ", "Paris", false, false, FOLD),
            Ok(Verdict::CorrectAsIs)
        );
    }

    #[test]
    fn full_case_folding_matches_non_ascii() {
        assert_eq!(
            classify("STRASSE", "Straße", false, false, FOLD),
            Ok(Verdict::CorrectAsIs)
        );
        assert_eq!(
            classify("ΣΊΣΥΦΟΣ", "σίσυφος", false, false, FOLD),
            Ok(Verdict::CorrectAsIs)
        );
        assert_eq!(normalize(" Straße ", FOLD), "strasse");
    }

    #[test]
    fn edited_match_is_correct_after_steps() {
        assert_eq!(
            classify("42", "42", true, true, FOLD),
            Ok(Verdict::CorrectAfterSteps)
        );
    }

    #[test]
    fn mismatch_is_provisional() {
        assert_eq!(
            classify("forty-two", "42", false, false, FOLD),
            Ok(Verdict::NoMatch)
        );
        assert_eq!(
            classify("forty-two", "42", true, true, FOLD),
            Ok(Verdict::NoMatch)
        );
    }

    #[test]
    fn empty_predefined_answer_is_config_error() {
        assert_eq!(
            classify("", "", false, false, FOLD),
            Err(ClassifyError::MissingPredefinedAnswer)
        );
        assert_eq!(
            classify("anything", "   ", false, false, FOLD),
            Err(ClassifyError::MissingPredefinedAnswer)
        );
    }

    #[test]
    fn whitespace_only_answer_never_matches() {
        assert_eq!(classify("  \n", "x", false, false, FOLD), Ok(Verdict::NoMatch));
    }

    #[test]
    fn edited_without_prior_miss_is_inconsistent() {
        assert_eq!(
            classify("42", "42", true, false, FOLD),
            Err(ClassifyError::InconsistentHistory)
        );
    }

    #[test]
    fn case_sensitive_policy() {
        let strict = MatchPolicy {
            case_sensitive: true,
        };
        assert_eq!(classify("paris", "Paris", false, false, strict), Ok(Verdict::NoMatch));
        assert_eq!(classify(" Paris", "Paris", false, false, strict), Ok(Verdict::CorrectAsIs));
        assert_eq!(classify("STRASSE", "Straße", false, false, strict), Ok(Verdict::NoMatch));
    }
}
