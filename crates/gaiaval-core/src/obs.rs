//! Structured lifecycle events for validation sessions.
//!
//! All events carry an `event` field (`session.submitted`,
//! `attempt.invoked`, ...) so they can be selected from JSON logs.

use tracing::{info, warn, Span};

/// Span tagged with the session and item, for instrumenting async work.
pub fn session_span(session_id: &str, item_id: &str) -> Span {
    tracing::info_span!("gaiaval.session", session_id = %session_id, item_id = %item_id)
}

pub fn emit_session_submitted(session_id: &str, item_id: &str, model: &str) {
    info!(event = "session.submitted", session_id = %session_id, item_id = %item_id, model = %model);
}

pub fn emit_attempt_invoked(session_id: &str, attempt: u32, edited: bool, steps: usize) {
    info!(
        event = "attempt.invoked",
        session_id = %session_id,
        attempt = attempt,
        edited = edited,
        steps = steps,
    );
}

pub fn emit_attempt_classified(session_id: &str, attempt: u32, verdict: &str) {
    info!(event = "attempt.classified", session_id = %session_id, attempt = attempt, verdict = %verdict);
}

pub fn emit_awaiting_edit(session_id: &str, attempt: u32, retries_left: u32) {
    info!(
        event = "session.awaiting_edit",
        session_id = %session_id,
        attempt = attempt,
        retries_left = retries_left,
    );
}

pub fn emit_session_resolved(session_id: &str, item_id: &str, attempt: u32, category: &str) {
    info!(
        event = "session.resolved",
        session_id = %session_id,
        item_id = %item_id,
        attempt = attempt,
        category = %category,
    );
}

pub fn emit_result_persisted(session_id: &str, item_id: &str, attempt: u32) {
    info!(event = "result.persisted", session_id = %session_id, item_id = %item_id, attempt = attempt);
}

/// Emit event: a terminal result could not be written (warning level).
pub fn emit_result_persist_failed(session_id: &str, item_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "result.persist_failed", session_id = %session_id, item_id = %item_id, error = %error);
}

/// Emit event: a per-attempt transcript could not be written (warning level).
pub fn emit_artifact_persist_failed(item_id: &str, attempt: u32, error: &dyn std::fmt::Display) {
    warn!(event = "artifact.persist_failed", item_id = %item_id, attempt = attempt, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_span_create() {
        session_span("session", "item").in_scope(|| {
            emit_session_submitted("session", "item", "gpt-4o");
        });
    }
}
