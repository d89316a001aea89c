//! Application state shared across all route handlers.
//!
//! Passed to handlers via axum's State extractor.

use std::sync::Arc;

use studybot_chat::ChatOrchestrator;

/// Shared application state.
///
/// Cloned per request; the orchestrator sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Runs one chat exchange per `/chat` request.
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: ChatOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
