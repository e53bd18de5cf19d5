//! OpenAI-compatible chat completions client.
//!
//! One `POST {api_base}/chat/completions` per invocation with a system and
//! a user message. Failures are returned as-is: retry policy belongs to the
//! validation session, not the transport.

use std::time::Duration;

use async_trait::async_trait;
use gaiaval_core::{InvocationError, InvocationRequest, ModelInvoker, ModelReply};
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::prompt;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: String,
    pub default_model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: api_key.into(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - OPENAI_API_KEY (required)
    /// - OPENAI_API_BASE (optional, default: "https://api.openai.com/v1")
    /// - OPENAI_MODEL (optional, default: "gpt-4o")
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config("OPENAI_API_KEY not set".to_string()))?;
        let mut config = Self::new(api_key);
        if let Some(base) = lookup("OPENAI_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            config.default_model = model;
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct OpenAiClient {
    config: OpenAiConfig,
    http: Client,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .user_agent(concat!("gaiaval/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Send one system + user exchange and return the raw response body
    /// together with the extracted message content.
    pub async fn chat(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<(String, String), LlmError> {
        let url = format!("{}/chat/completions", self.config.api_base);
        let body = build_request_body(model, system, user);

        debug!(model = %model, system = %system, "system prompt");
        debug!(model = %model, user = %user, "user prompt");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(api_base = %self.config.api_base, error = %e, "LLM request failed");
                LlmError::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(status = %status, body = %text, "LLM API returned an error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let content = parse_content(&text)?;
        debug!(model = %model, response = %content, "model response");
        Ok((text, content))
    }
}

/// Model names are sent lowercased (`GPT-4o` becomes `gpt-4o`).
fn build_request_body(model: &str, system: &str, user: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model.to_lowercase(),
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": user},
        ],
    })
}

fn parse_content(body: &str) -> Result<String, LlmError> {
    let data: serde_json::Value =
        serde_json::from_str(body).map_err(|e| LlmError::Malformed(e.to_string()))?;
    let content = data
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content.to_string())
}

fn transcript(model: &str, system: &str, user: &str, raw_response: &str) -> String {
    format!(
        "model: {}\n--- system ---\n{system}\n--- user ---\n{user}\n--- response ---\n{raw_response}\n",
        model.to_lowercase()
    )
}

#[async_trait]
impl ModelInvoker for OpenAiClient {
    async fn invoke(&self, request: &InvocationRequest) -> Result<ModelReply, InvocationError> {
        let model = if request.model.trim().is_empty() {
            self.config.default_model.as_str()
        } else {
            request.model.as_str()
        };
        let system = prompt::system_prompt(&request.steps);
        let user = prompt::format_user_content(&request.question, &request.steps);

        let (raw, answer) = self
            .chat(model, system, &user)
            .await
            .map_err(|e| e.into_invocation_error(self.config.timeout.as_secs()))?;

        Ok(ModelReply {
            answer,
            transcript: transcript(model, system, &user, &raw),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn config_defaults() {
        let config = OpenAiConfig::from_lookup(env(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.default_model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn config_overrides_and_trims_base() {
        let config = OpenAiConfig::from_lookup(env(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:8000/v1/"),
            ("OPENAI_MODEL", "gpt-4"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:8000/v1");
        assert_eq!(config.default_model, "gpt-4");
    }

    #[test]
    fn config_requires_api_key() {
        assert!(matches!(
            OpenAiConfig::from_lookup(env(&[])),
            Err(LlmError::Config(_))
        ));
        assert!(OpenAiConfig::from_lookup(env(&[("OPENAI_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn request_body_lowercases_model() {
        let body = build_request_body("GPT-4o", "sys", "usr");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");
    }

    #[test]
    fn parse_content_extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Paris"}}]}"#;
        assert_eq!(parse_content(body).unwrap(), "Paris");
    }

    #[test]
    fn parse_content_rejects_missing_or_blank() {
        assert!(matches!(
            parse_content(r#"{"choices":[]}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            parse_content(r#"{"choices":[{"message":{"content":"  "}}]}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            parse_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(parse_content("<html>"), Err(LlmError::Malformed(_))));
    }

    #[test]
    fn transcript_contains_prompts_and_response() {
        let t = transcript("GPT-4", "sys", "usr", "{\"raw\":true}");
        assert!(t.starts_with("model: gpt-4\n"));
        assert!(t.contains("--- user ---\nusr"));
        assert!(t.contains("{\"raw\":true}"));
    }
}
