//! Completion client trait and its failure kinds.

use async_trait::async_trait;

use crate::prompt::StructuredPrompt;

/// Failures surfaced by a completion provider. None are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("provider rejected credentials: {0}")]
    Auth(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider rejected request: {0}")]
    InvalidRequest(String),
    #[error("provider timed out: {0}")]
    Timeout(String),
}

/// Sends a structured prompt to a language model and returns its reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, CompletionError>;
}
