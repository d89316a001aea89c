//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use studybot_core::error::StudyBotError;

use crate::migrations;

/// Where a database lives, parsed from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Private in-memory database, gone when the process exits.
    Memory,
    /// On-disk SQLite file.
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parse a connection string.
    ///
    /// Accepts `:memory:`, `sqlite::memory:`, or a file path with an optional
    /// `sqlite://` prefix. A leading `~/` expands to the home directory.
    pub fn parse(url: &str) -> Result<Self, StudyBotError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StudyBotError::Config(
                "database_url must not be empty".to_string(),
            ));
        }
        if url == ":memory:" || url == "sqlite::memory:" {
            return Ok(DatabaseLocation::Memory);
        }
        let path = url.strip_prefix("sqlite://").unwrap_or(url);
        Ok(DatabaseLocation::File(expand_home(path)))
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Thread-safe SQLite database wrapper.
///
/// The connection is wrapped in a Mutex since rusqlite Connection is not
/// Sync. Every access holds the lock for the duration of one closure.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open a database from a connection string.
    pub fn open(url: &str) -> Result<Self, StudyBotError> {
        match DatabaseLocation::parse(url)? {
            DatabaseLocation::Memory => Self::in_memory(),
            DatabaseLocation::File(path) => Self::new(&path),
        }
    }

    /// Open (or create) a database at the given path.
    ///
    /// Configures WAL mode, synchronous=NORMAL, and runs all pending
    /// migrations.
    pub fn new(path: &Path) -> Result<Self, StudyBotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| StudyBotError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| StudyBotError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!("Database opened at {}", path.display());

        Self::with_migrations(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StudyBotError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            StudyBotError::Storage(format!("Failed to open in-memory db: {}", e))
        })?;

        Self::with_migrations(conn)
    }

    fn with_migrations(conn: Connection) -> Result<Self, StudyBotError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// The mutex is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StudyBotError>
    where
        F: FnOnce(&Connection) -> Result<T, StudyBotError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StudyBotError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Execute a closure inside a transaction.
    ///
    /// Commits when the closure returns `Ok`, rolls back otherwise.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, StudyBotError>
    where
        F: FnOnce(&Connection) -> Result<T, StudyBotError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StudyBotError::Storage(format!("Database lock poisoned: {}", e)))?;
        let tx = conn
            .transaction()
            .map_err(|e| StudyBotError::Storage(format!("Failed to begin transaction: {}", e)))?;
        let value = f(&tx)?;
        tx.commit()
            .map_err(|e| StudyBotError::Storage(format!("Failed to commit transaction: {}", e)))?;
        Ok(value)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
