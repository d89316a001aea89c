//! Chat orchestrator: one question in, one answer out.
//!
//! Fetches the user's history, assembles the prompt, calls the completion
//! provider and records the exchange. Each step runs sequentially within a
//! request; nothing is shared between requests beyond the injected store and
//! client.

use std::sync::Arc;

use studybot_storage::HistoryStore;

use crate::completion::CompletionClient;
use crate::error::ChatError;
use crate::prompt::PromptAssembler;

/// Coordinates history, prompt assembly and completion for a chat exchange.
pub struct ChatOrchestrator {
    store: Arc<dyn HistoryStore>,
    client: Arc<dyn CompletionClient>,
    assembler: PromptAssembler,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        client: Arc<dyn CompletionClient>,
        assembler: PromptAssembler,
    ) -> Self {
        Self {
            store,
            client,
            assembler,
        }
    }

    /// Answer `question` for `user_id` and record the exchange.
    ///
    /// Nothing is written unless the provider answers. On success the
    /// question and answer are stored together, user turn first.
    pub async fn handle(&self, user_id: &str, question: &str) -> Result<String, ChatError> {
        if user_id.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "'user_id' must not be empty".to_string(),
            ));
        }
        if question.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "'question' must not be empty".to_string(),
            ));
        }

        let history = self.store.get_history(user_id).await?;
        let prompt = self.assembler.assemble(&history, question);

        tracing::debug!(
            user_id = %user_id,
            history_turns = history.len(),
            prompt_messages = prompt.len(),
            "Prompt assembled"
        );

        let answer = match self.client.complete(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Completion failed");
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.append_exchange(user_id, question, &answer).await {
            tracing::error!(user_id = %user_id, error = %e, "Failed to record exchange");
            return Err(e.into());
        }

        tracing::info!(
            user_id = %user_id,
            history_turns = history.len(),
            answer_len = answer.len(),
            "Chat exchange recorded"
        );

        Ok(answer)
    }
}
