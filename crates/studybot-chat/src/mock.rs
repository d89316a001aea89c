//! Scripted completion client for tests and offline runs.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::completion::{CompletionClient, CompletionError};
use crate::prompt::StructuredPrompt;

/// A `CompletionClient` that returns a fixed outcome and records every
/// prompt it was given.
pub struct MockCompletion {
    outcome: Result<String, CompletionError>,
    prompts: Mutex<Vec<StructuredPrompt>>,
}

impl MockCompletion {
    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with `error`.
    pub fn failing(error: CompletionError) -> Self {
        Self {
            outcome: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<StructuredPrompt> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, prompt: &StructuredPrompt) -> Result<String, CompletionError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.outcome.clone()
    }
}
