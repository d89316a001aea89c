//! Domain types shared across the StudyBot crates.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StudyBotError;

// =============================================================================
// Role
// =============================================================================

/// Who produced a persisted conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student asking a question.
    User,
    /// The model's answer.
    Assistant,
}

impl Role {
    /// Stable lowercase name used in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StudyBotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(StudyBotError::InvalidRecord(format!(
                "unknown role '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// ConversationTurn
// =============================================================================

/// One immutable message in a user's history.
///
/// Turns are created once, right after a question is answered, and are only
/// ever read back as a full per-user scan ordered by `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Opaque conversation owner. Not validated for format.
    pub user_id: String,
    pub role: Role,
    pub message: String,
    /// Assigned by the writer at insertion time.
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        user_id: impl Into<String>,
        role: Role,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            message: message.into(),
            timestamp,
        }
    }
}
