//! Turn repository: per-user conversation history backed by SQLite.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use studybot_core::error::StudyBotError;
use studybot_core::types::{ConversationTurn, Role};

use crate::db::Database;

/// Repository for conversation turns.
///
/// Each repository is one writer: timestamps it assigns are strictly
/// increasing, even when the wall clock has not moved between two writes.
/// The counter starts after the newest stored turn, so a clock that moved
/// backwards across a restart cannot place new turns before old ones.
pub struct TurnRepository {
    db: Arc<Database>,
    last_stamp_micros: AtomicI64,
}

impl TurnRepository {
    pub fn new(db: Arc<Database>) -> Result<Self, StudyBotError> {
        let newest: Option<i64> = db.with_conn(|conn| {
            conn.query_row("SELECT MAX(timestamp) FROM turns", [], |row| row.get(0))
                .map_err(|e| StudyBotError::Storage(e.to_string()))
        })?;
        Ok(Self {
            db,
            last_stamp_micros: AtomicI64::new(newest.unwrap_or(i64::MIN)),
        })
    }

    /// Next writer timestamp, at least 1µs after the previous one.
    pub fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let prev = self
            .last_stamp_micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|v| v);
        let stamp = now.max(prev.saturating_add(1));
        DateTime::from_timestamp_micros(stamp).unwrap_or_else(Utc::now)
    }

    /// Full history for a user as `(role, message)` pairs, oldest first.
    ///
    /// An unknown user yields an empty vector.
    pub fn get_history(&self, user_id: &str) -> Result<Vec<(Role, String)>, StudyBotError> {
        Ok(self
            .turns_for_user(user_id)?
            .into_iter()
            .map(|turn| (turn.role, turn.message))
            .collect())
    }

    /// Full history for a user as complete records, oldest first.
    pub fn turns_for_user(&self, user_id: &str) -> Result<Vec<ConversationTurn>, StudyBotError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT user_id, role, message, timestamp
                     FROM turns
                     WHERE user_id = ?1
                     ORDER BY timestamp ASC, id ASC",
                )
                .map_err(|e| StudyBotError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![user_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                })
                .map_err(|e| StudyBotError::Storage(e.to_string()))?;

            let mut turns = Vec::new();
            for row in rows {
                let (user_id, role, message, stamp) =
                    row.map_err(|e| StudyBotError::Storage(e.to_string()))?;
                turns.push(ConversationTurn {
                    user_id,
                    role: role.parse()?,
                    message,
                    timestamp: micros_to_datetime(stamp)?,
                });
            }
            Ok(turns)
        })
    }

    /// Insert one turn. Duplicate timestamps are accepted.
    pub fn append_turn(
        &self,
        user_id: &str,
        role: Role,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StudyBotError> {
        self.db
            .with_conn(|conn| insert_turn(conn, user_id, role, message, timestamp))
    }

    /// Record a question and its answer as one unit.
    ///
    /// Both rows are written in a single transaction, the user turn first.
    /// Each gets its own timestamp, the assistant's strictly later.
    pub fn append_exchange(
        &self,
        user_id: &str,
        question: &str,
        answer: &str,
    ) -> Result<(ConversationTurn, ConversationTurn), StudyBotError> {
        self.db.with_transaction(|conn| {
            let asked_at = self.next_timestamp();
            insert_turn(conn, user_id, Role::User, question, asked_at)?;
            let answered_at = self.next_timestamp();
            insert_turn(conn, user_id, Role::Assistant, answer, answered_at)?;

            Ok((
                ConversationTurn::new(user_id, Role::User, question, asked_at),
                ConversationTurn::new(user_id, Role::Assistant, answer, answered_at),
            ))
        })
    }

    /// Number of stored turns for a user.
    pub fn count_for_user(&self, user_id: &str) -> Result<u64, StudyBotError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM turns WHERE user_id = ?1",
                    rusqlite::params![user_id],
                    |row| row.get(0),
                )
                .map_err(|e| StudyBotError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

fn insert_turn(
    conn: &Connection,
    user_id: &str,
    role: Role,
    message: &str,
    timestamp: DateTime<Utc>,
) -> Result<(), StudyBotError> {
    conn.execute(
        "INSERT INTO turns (user_id, role, message, timestamp) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![user_id, role.as_str(), message, timestamp.timestamp_micros()],
    )
    .map_err(|e| StudyBotError::Storage(format!("Failed to save turn: {}", e)))?;
    Ok(())
}

fn micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, StudyBotError> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        StudyBotError::InvalidRecord(format!("timestamp out of range: {}", micros))
    })
}
