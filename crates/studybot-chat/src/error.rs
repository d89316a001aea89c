//! Error types for the chat exchange.

use studybot_core::error::StudyBotError;

use crate::completion::CompletionError;

/// Errors from one chat exchange, by failure kind.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("authentication with completion provider failed: {0}")]
    Auth(String),
    #[error("completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("completion provider timed out: {0}")]
    Timeout(String),
}

impl From<StudyBotError> for ChatError {
    fn from(err: StudyBotError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

impl From<CompletionError> for ChatError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Auth(msg) => ChatError::Auth(msg),
            CompletionError::Unavailable(msg) => ChatError::ProviderUnavailable(msg),
            CompletionError::InvalidRequest(msg) => ChatError::InvalidRequest(msg),
            CompletionError::Timeout(msg) => ChatError::Timeout(msg),
        }
    }
}
