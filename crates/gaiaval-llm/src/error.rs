use gaiaval_core::InvocationError;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("model client misconfigured: {0}")]
    Config(String),

    #[error("request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("response had no message content")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(err.to_string())
        }
    }
}

impl LlmError {
    /// Map onto the workflow's invocation error, given the configured timeout.
    pub fn into_invocation_error(self, timeout_secs: u64) -> InvocationError {
        match self {
            LlmError::Timeout => InvocationError::Timeout { secs: timeout_secs },
            LlmError::Api { status, body } => InvocationError::Api {
                status,
                message: body,
            },
            LlmError::EmptyResponse => InvocationError::EmptyResponse,
            LlmError::Config(msg) | LlmError::Http(msg) | LlmError::Malformed(msg) => {
                InvocationError::Transport(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status() {
        let err = LlmError::Api {
            status: 429,
            body: "rate limited".into(),
        }
        .into_invocation_error(120);
        assert_eq!(
            err,
            InvocationError::Api {
                status: 429,
                message: "rate limited".into()
            }
        );
    }

    #[test]
    fn timeout_carries_configured_seconds() {
        assert_eq!(
            LlmError::Timeout.into_invocation_error(30),
            InvocationError::Timeout { secs: 30 }
        );
        assert!(matches!(
            LlmError::Malformed("bad json".into()).into_invocation_error(30),
            InvocationError::Transport(_)
        ));
    }
}
