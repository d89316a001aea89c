pub mod config;
pub mod error;
pub mod persona;
pub mod types;

pub use config::StudyBotConfig;
pub use error::{Result, StudyBotError};
pub use types::*;
