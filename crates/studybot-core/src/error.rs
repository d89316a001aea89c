use thiserror::Error;

/// Top-level error type for the StudyBot service.
///
/// Storage and configuration failures are reported through this type. The
/// chat and API crates define their own error types and convert from it so
/// that `?` works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyBotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for StudyBotError {
    fn from(err: toml::de::Error) -> Self {
        StudyBotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StudyBotError {
    fn from(err: toml::ser::Error) -> Self {
        StudyBotError::Config(err.to_string())
    }
}

/// A specialized `Result` type for StudyBot operations.
pub type Result<T> = std::result::Result<T, StudyBotError>;
