//! Error taxonomy for the validation workflow.

use gaiaval_state::StorageError;

use crate::session::SessionState;

/// Configuration errors raised by the outcome classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("item has no predefined answer to compare against")]
    MissingPredefinedAnswer,

    #[error("edited attempt classified without a prior non-matching attempt")]
    InconsistentHistory,
}

/// Failure of a single model invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("invocation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Errors surfaced by [`ValidationSession`](crate::session::ValidationSession) operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("item source unavailable: {0}")]
    DataUnavailable(String),

    #[error("item not found: {task_id}")]
    ItemNotFound { task_id: String },

    #[error("item {task_id} is already resolved in this session")]
    AlreadyResolved { task_id: String },

    #[error("cannot {action} while session is {from}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },

    #[error("classification error: {0}")]
    Classification(#[from] ClassifyError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("no unsaved result to persist")]
    NothingToPersist,
}

/// Errors loading [`ValidationConfig`](crate::config::ValidationConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_error_display() {
        let err = InvocationError::Timeout { secs: 120 };
        assert_eq!(err.to_string(), "invocation timed out after 120s");

        let err = InvocationError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        };
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_invalid_transition_names_state() {
        let err = SessionError::InvalidTransition {
            from: SessionState::Resolved,
            action: "submit edited steps",
        };
        assert_eq!(
            err.to_string(),
            "cannot submit edited steps while session is resolved"
        );
    }

    #[test]
    fn test_storage_error_converts() {
        let err: SessionError = StorageError::Backend("down".to_string()).into();
        assert!(matches!(err, SessionError::Storage(_)));
    }
}
