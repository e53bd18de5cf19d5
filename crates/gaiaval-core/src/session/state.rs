//! Session state machine.

use serde::{Deserialize, Serialize};

/// Where a [`ValidationSession`](super::ValidationSession) is in its lifecycle.
///
/// ```text
/// Idle -> Invoking -> Classifying -> AwaitingEdit -> Invoking -> ... -> Resolved
///                  \-> Resolved (invocation failed)   \-> Resolved (declined)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Invoking,
    Classifying,
    AwaitingEdit,
    Resolved,
}

impl SessionState {
    /// Whether a model invocation may start from this state.
    pub fn can_invoke(self) -> bool {
        matches!(self, SessionState::Idle | SessionState::AwaitingEdit)
    }

    pub fn is_terminal(self) -> bool {
        self == SessionState::Resolved
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Invoking => "invoking",
            SessionState::Classifying => "classifying",
            SessionState::AwaitingEdit => "awaiting edit",
            SessionState::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
