//! StudyBot storage crate - SQLite persistence for conversation history.
//!
//! Provides a WAL-mode SQLite database with migrations, the turn repository
//! that reads and appends per-user history, and the async `HistoryStore`
//! seam the chat orchestrator depends on.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod store;

pub use db::{Database, DatabaseLocation};
pub use repository::TurnRepository;
pub use store::{HistoryStore, SqliteHistoryStore};
