//! Async history store seam.
//!
//! The chat orchestrator depends on `HistoryStore` rather than on SQLite
//! directly, so tests and alternative backends can be injected.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use studybot_core::error::StudyBotError;
use studybot_core::types::{ConversationTurn, Role};

use crate::db::Database;
use crate::repository::TurnRepository;

/// Persistent, per-user conversation history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// All turns for `user_id` as `(role, message)`, oldest first. Empty for
    /// an unknown user.
    async fn get_history(&self, user_id: &str) -> Result<Vec<(Role, String)>, StudyBotError>;

    /// Insert a single turn.
    async fn append_turn(
        &self,
        user_id: &str,
        role: Role,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StudyBotError>;

    /// Insert a question and its answer atomically, user turn first.
    async fn append_exchange(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(ConversationTurn, ConversationTurn), StudyBotError>;
}

/// `HistoryStore` over the SQLite turn repository.
///
/// rusqlite is blocking, so every call runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    repo: Arc<TurnRepository>,
}

impl SqliteHistoryStore {
    pub fn new(db: Arc<Database>) -> Result<Self, StudyBotError> {
        Ok(Self {
            repo: Arc::new(TurnRepository::new(db)?),
        })
    }

    /// Direct access to the underlying repository.
    pub fn repository(&self) -> &TurnRepository {
        &self.repo
    }

    async fn run<F, T>(&self, f: F) -> Result<T, StudyBotError>
    where
        F: FnOnce(&TurnRepository) -> Result<T, StudyBotError> + Send + 'static,
        T: Send + 'static,
    {
        let repo = Arc::clone(&self.repo);
        tokio::task::spawn_blocking(move || f(&repo))
            .await
            .map_err(|e| StudyBotError::Storage(format!("Storage task failed: {}", e)))?
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn get_history(&self, user_id: &str) -> Result<Vec<(Role, String)>, StudyBotError> {
        let user_id = user_id.to_string();
        self.run(move |repo| repo.get_history(&user_id)).await
    }

    async fn append_turn(
        &self,
        user_id: &str,
        role: Role,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StudyBotError> {
        let user_id = user_id.to_string();
        let message = message.to_string();
        self.run(move |repo| repo.append_turn(&user_id, role, &message, timestamp))
            .await
    }

    async fn append_exchange(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(ConversationTurn, ConversationTurn), StudyBotError> {
        let user_id = user_id.to_string();
        let question = question.to_string();
        let answer = answer.to_string();
        self.run(move |repo| repo.append_exchange(&user_id, &question, &answer))
            .await
    }
}
