//! Validation workflow configuration.
//!
//! Layering, lowest to highest precedence: built-in defaults, an optional
//! TOML file, `GAIAVAL_*` environment variables, then explicit overrides
//! applied by the caller (CLI flags).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::MatchPolicy;
use crate::domain::ConfigError;

pub const ENV_MAX_RETRIES: &str = "GAIAVAL_MAX_RETRIES";
pub const ENV_MATCH_CASE_SENSITIVE: &str = "GAIAVAL_MATCH_CASE_SENSITIVE";
pub const ENV_INVOCATION_TIMEOUT_SECS: &str = "GAIAVAL_INVOCATION_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Edited-steps retries allowed after the first non-matching attempt.
    pub max_retries: u32,
    pub match_case_sensitive: bool,
    pub invocation_timeout_secs: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            match_case_sensitive: false,
            invocation_timeout_secs: 120,
        }
    }
}

impl ValidationConfig {
    /// Defaults, then `path` (if given), then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "loaded validation config");
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `GAIAVAL_*` overrides read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            self.max_retries = parse_var(ENV_MAX_RETRIES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MATCH_CASE_SENSITIVE) {
            self.match_case_sensitive = parse_var(ENV_MATCH_CASE_SENSITIVE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_INVOCATION_TIMEOUT_SECS) {
            self.invocation_timeout_secs = parse_var(ENV_INVOCATION_TIMEOUT_SECS, &raw)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.invocation_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "invocation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy {
            case_sensitive: self.match_case_sensitive,
        }
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.invocation_timeout_secs)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{key}={raw:?} is not a valid value")))
}
