//! Conversational core for StudyBot.
//!
//! Assembles prompts from stored history, calls the completion provider,
//! and records each answered exchange.

pub mod completion;
pub mod error;
pub mod mock;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use completion::{CompletionClient, CompletionError};
pub use error::ChatError;
pub use mock::MockCompletion;
pub use orchestrator::ChatOrchestrator;
pub use prompt::{build_prompt, PromptAssembler, PromptMessage, PromptRole, StructuredPrompt};
pub use provider::OpenAiCompatClient;
