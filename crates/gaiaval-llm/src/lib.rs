//! Hosted model client for GAIA Validator.
//!
//! Implements [`gaiaval_core::ModelInvoker`] over an OpenAI-compatible chat
//! completions API.

pub mod client;
pub mod error;
pub mod prompt;

pub use client::{OpenAiClient, OpenAiConfig, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use error::LlmError;
