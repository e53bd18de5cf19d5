//! Model invocation seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::InvocationError;

/// Everything a model needs to answer one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub task_id: String,
    pub question: String,
    /// Validation steps to include; empty for a plain question.
    pub steps: Vec<String>,
    pub model: String,
}

/// A model's answer plus the raw exchange that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub answer: String,
    /// Prompts and raw response, kept as a per-attempt artifact.
    pub transcript: String,
}

/// Sends one question to a hosted model. Implementations never retry.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, request: &InvocationRequest) -> Result<ModelReply, InvocationError>;
}
